use iced::widget::{Column, Space, button, column, container, horizontal_space, row, scrollable, text};
use iced::{Background, Border, Color, Element, Font, Length, Padding, Theme};

use xeditor_core::FileNode;

use crate::app::{App, Message};
use crate::theme::colors;

impl App {
    pub fn view_sidebar(&self) -> Element<'_, Message> {
        let small_btn_style = |_: &Theme, status: button::Status| -> button::Style {
            let bg = match status {
                button::Status::Hovered => colors::BG_HOVER,
                button::Status::Pressed => colors::BG_ACTIVE,
                _ => colors::BG_MEDIUM,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: colors::TEXT_SECONDARY,
                border: Border {
                    radius: 3.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        };

        let root = self.editor.navigator().root_node();

        let header = container(
            column![
                row![
                    text("EXPLORER").size(11).color(colors::TEXT_SECONDARY),
                    horizontal_space(),
                    button(text("R").size(10).font(Font::MONOSPACE))
                        .padding(Padding::from([2, 6]))
                        .style(small_btn_style)
                        .on_press(Message::RefreshTree),
                ]
                .spacing(4)
                .align_y(iced::Alignment::Center),
                text(root.name.clone()).size(12).color(colors::TEXT_PRIMARY),
            ]
            .spacing(4),
        )
        .padding(Padding::from([10, 12]))
        .width(Length::Fill)
        .style(|_| container::Style {
            background: Some(Background::Color(colors::BG_MEDIUM)),
            ..Default::default()
        });

        // The root itself is the header; rows start at its children.
        let rows: Vec<Element<'_, Message>> = self
            .editor
            .navigator()
            .visible_rows()
            .into_iter()
            .skip(1)
            .map(|node| self.make_file_item(node))
            .collect();

        let file_content: Element<'_, Message> = if rows.is_empty() {
            container(
                column![
                    Space::with_height(40),
                    text("Empty folder").size(13).color(colors::TEXT_MUTED),
                ]
                .align_x(iced::Alignment::Center)
                .width(Length::Fill),
            )
            .height(Length::Fill)
            .into()
        } else {
            scrollable(Column::with_children(rows).spacing(1).width(Length::Fill))
                .height(Length::Fill)
                .into()
        };

        container(column![header, file_content])
            .width(Length::Fixed(self.sidebar_width))
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_LIGHT)),
                border: Border {
                    color: colors::BORDER,
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    pub fn make_file_item(&self, node: &FileNode) -> Element<'_, Message> {
        let icon = if node.is_dir {
            if node.expanded { "[-]" } else { "[+]" }
        } else {
            file_icon(&node.name)
        };

        let is_open = self
            .editor
            .active_document()
            .map(|doc| doc.path() == node.path)
            .unwrap_or(false);
        let is_selected = self.row_clicks.selected() == Some(node.path.as_path());

        let bg = if is_open {
            colors::BG_ACTIVE
        } else if is_selected {
            colors::BG_HOVER
        } else {
            Color::TRANSPARENT
        };

        // Children of the root sit at depth 1.
        let indent = f32::from(node.depth.saturating_sub(1)) * 16.0 + 8.0;

        button(
            row![
                Space::with_width(Length::Fixed(indent)),
                text(icon).size(12).font(Font::MONOSPACE).color(colors::TEXT_MUTED),
                Space::with_width(6),
                text(node.name.clone()).size(13).color(if is_open {
                    colors::TEXT_PRIMARY
                } else {
                    colors::TEXT_SECONDARY
                }),
            ]
            .align_y(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::from([4, 0]))
        .style(move |_, status| {
            let hover_bg = match status {
                button::Status::Hovered => colors::BG_HOVER,
                _ => bg,
            };
            button::Style {
                background: Some(Background::Color(hover_bg)),
                text_color: colors::TEXT_PRIMARY,
                border: Border::default(),
                ..Default::default()
            }
        })
        .on_press(Message::TreeRowPressed {
            path: node.path.clone(),
            is_dir: node.is_dir,
        })
        .into()
    }
}

fn file_icon(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("");
    match ext {
        "py" | "pyw" => " py",
        "rs" => " rs",
        "js" | "ts" => " js",
        "json" | "toml" | "yaml" | "yml" => " {}",
        "md" => " md",
        "txt" => " tx",
        "sh" => " sh",
        _ => "  .",
    }
}

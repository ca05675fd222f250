use iced::widget::text_editor::{Binding, KeyPress};
use iced::widget::{
    Column, Row, Space, button, column, container, horizontal_space, row, scrollable, stack, text,
    text_editor,
};
use iced::{Background, Border, Color, Element, Font, Length, Padding, Theme};

use crate::app::update::shortcut;
use crate::app::{App, CompletionPopup, Message};
use crate::theme::colors;

/// Rows shown in the completion popup before it scrolls.
const POPUP_ROWS: usize = 12;

impl App {
    pub fn view_main_area(&self) -> Element<'_, Message> {
        column![self.view_tabs(), self.view_editor()]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn view_tabs(&self) -> Element<'_, Message> {
        let active = self.editor.active_index();

        let mut tabs_vec: Vec<Element<'_, Message>> = self
            .editor
            .documents()
            .enumerate()
            .map(|(idx, doc)| self.make_tab(doc.name(), idx, active == Some(idx), doc.is_dirty()))
            .collect();

        tabs_vec.push(horizontal_space().into());

        let tabs_row = Row::with_children(tabs_vec)
            .spacing(1)
            .align_y(iced::Alignment::End);

        container(tabs_row)
            .width(Length::Fill)
            .height(36)
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_MEDIUM)),
                border: Border {
                    color: colors::BORDER,
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    pub fn make_tab(
        &self,
        name: &str,
        idx: usize,
        is_active: bool,
        modified: bool,
    ) -> Element<'_, Message> {
        let display_name = if modified {
            format!("{} *", name)
        } else {
            name.to_string()
        };

        let close_btn = button(text("x").size(12).color(colors::TEXT_MUTED))
            .padding(Padding::from([2, 6]))
            .style(|_, status| {
                let bg = match status {
                    button::Status::Hovered => colors::BG_HOVER,
                    _ => Color::TRANSPARENT,
                };
                button::Style {
                    background: Some(Background::Color(bg)),
                    text_color: colors::TEXT_PRIMARY,
                    border: Border {
                        radius: 2.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                }
            })
            .on_press(Message::CloseTab(idx));

        let tab_content = row![
            text(display_name).size(13).color(if is_active {
                colors::TEXT_PRIMARY
            } else {
                colors::TEXT_SECONDARY
            }),
            Space::with_width(8),
            close_btn,
        ]
        .align_y(iced::Alignment::Center);

        let bg = if is_active {
            colors::BG_DARK
        } else {
            colors::BG_MEDIUM
        };

        button(tab_content)
            .padding(Padding::from([8, 14]))
            .style(move |_, status| {
                let hover_bg = match status {
                    button::Status::Hovered if !is_active => colors::BG_HOVER,
                    _ => bg,
                };
                button::Style {
                    background: Some(Background::Color(hover_bg)),
                    text_color: colors::TEXT_PRIMARY,
                    border: Border {
                        color: if is_active {
                            colors::ACCENT
                        } else {
                            Color::TRANSPARENT
                        },
                        width: if is_active { 2.0 } else { 0.0 },
                        radius: 0.0.into(),
                    },
                    ..Default::default()
                }
            })
            .on_press(Message::TabSelected(idx))
            .into()
    }

    pub fn view_editor(&self) -> Element<'_, Message> {
        let Some(content) = self.active_content() else {
            return container(
                column![
                    text("No file open").size(16).color(colors::TEXT_MUTED),
                    text("Ctrl+O to open a file, or double-click one in the explorer")
                        .size(12)
                        .color(colors::TEXT_MUTED),
                ]
                .spacing(8)
                .align_x(iced::Alignment::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_DARK)),
                ..Default::default()
            })
            .into();
        };

        let editor = text_editor(content)
            .height(Length::Fill)
            .padding(iced::Padding {
                top: 16.0,
                right: 20.0,
                bottom: 16.0,
                left: 16.0,
            })
            .font(Font::MONOSPACE)
            .size(self.editor.config().ui.font_size)
            .style(|_theme: &Theme, _status| text_editor::Style {
                background: Background::Color(colors::BG_DARK),
                border: Border {
                    width: 0.0,
                    radius: 0.0.into(),
                    color: Color::TRANSPARENT,
                },
                icon: colors::TEXT_MUTED,
                placeholder: colors::TEXT_MUTED,
                value: colors::TEXT_PRIMARY,
                selection: colors::SELECTION,
            })
            .key_binding(|key_press: KeyPress| {
                match shortcut(&key_press.key, key_press.modifiers) {
                    Some(message) => Some(Binding::Custom(message)),
                    None => Binding::from_key_press(key_press),
                }
            })
            .on_action(Message::EditorAction);

        match &self.completion {
            Some(popup) => stack![editor, self.view_completion_popup(popup)].into(),
            None => editor.into(),
        }
    }

    fn view_completion_popup(&self, popup: &CompletionPopup) -> Element<'_, Message> {
        let item_style = |_: &Theme, status: button::Status| -> button::Style {
            let bg = match status {
                button::Status::Hovered => colors::BG_HOVER,
                _ => colors::BG_MEDIUM,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: colors::TEXT_PRIMARY,
                border: Border::default(),
                ..Default::default()
            }
        };

        let items: Vec<Element<'_, Message>> = popup
            .items
            .iter()
            .map(|name| {
                button(text(name.clone()).size(13).font(Font::MONOSPACE))
                    .width(Length::Fill)
                    .padding(Padding::from([4, 10]))
                    .style(item_style)
                    .on_press(Message::CompletionChosen(name.clone()))
                    .into()
            })
            .collect();

        let rows = popup.items.len().min(POPUP_ROWS) as f32;
        let list = scrollable(Column::with_children(items)).height(Length::Fixed(rows * 26.0));

        let panel = container(
            column![
                row![
                    text(format!("Completions for '{}'", popup.prefix))
                        .size(11)
                        .color(colors::TEXT_SECONDARY),
                    horizontal_space(),
                    button(text("x").size(11).color(colors::TEXT_MUTED))
                        .padding(Padding::from([0, 6]))
                        .style(item_style)
                        .on_press(Message::DismissCompletion),
                ]
                .align_y(iced::Alignment::Center),
                list,
            ]
            .spacing(4),
        )
        .width(Length::Fixed(320.0))
        .padding(6)
        .style(|_| container::Style {
            background: Some(Background::Color(colors::BG_MEDIUM)),
            border: Border {
                color: colors::BORDER,
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        });

        container(panel)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_right(Length::Fill)
            .align_bottom(Length::Fill)
            .padding(16)
            .into()
    }
}

use iced::widget::{Row, button, container, horizontal_space, text};
use iced::{Background, Border, Element, Length, Padding, Theme};

use crate::app::{App, Message};
use crate::theme::colors;

fn toolbar_button<'a>(label: String, on_press: Option<Message>) -> Element<'a, Message> {
    let enabled = on_press.is_some();
    button(text(label).size(12).color(if enabled {
        colors::TEXT_PRIMARY
    } else {
        colors::TEXT_MUTED
    }))
    .padding(Padding::from([6, 10]))
    .style(|_: &Theme, status: button::Status| {
        let bg = match status {
            button::Status::Hovered => colors::BG_HOVER,
            button::Status::Pressed => colors::BG_ACTIVE,
            _ => colors::BG_MEDIUM,
        };
        button::Style {
            background: Some(Background::Color(bg)),
            text_color: colors::TEXT_PRIMARY,
            border: Border {
                radius: 4.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    })
    .on_press_maybe(on_press)
    .into()
}

impl App {
    /// Open File, Open Folder, Run, then one button per plugin command.
    pub fn view_toolbar(&self) -> Element<'_, Message> {
        let idle = !self.is_running();

        let mut items: Vec<Element<'_, Message>> = vec![
            toolbar_button("Open File".to_string(), Some(Message::OpenFile)),
            toolbar_button("Open Folder".to_string(), Some(Message::OpenFolder)),
            toolbar_button("Run".to_string(), idle.then_some(Message::Run)),
        ];

        for command in self.plugins.commands() {
            items.push(toolbar_button(
                command.title.clone(),
                idle.then(|| Message::PluginCommand(command.id.clone())),
            ));
        }

        items.push(horizontal_space().into());

        let toolbar = Row::with_children(items)
            .spacing(2)
            .padding(Padding::from([4, 8]))
            .align_y(iced::Alignment::Center);

        container(toolbar)
            .width(Length::Fill)
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
}

use iced::widget::{Space, button, column, container, horizontal_space, row, scrollable, text};
use iced::{Background, Border, Color, Element, Font, Length, Padding, Theme};

use crate::app::{App, Message, Modal};
use crate::theme::colors;

fn dialog_button<'a>(label: &'a str, message: Message) -> Element<'a, Message> {
    button(text(label).size(13).color(Color::WHITE))
        .padding(Padding::from([8, 24]))
        .style(|_: &Theme, status: button::Status| {
            let bg = match status {
                button::Status::Hovered => Color::from_rgb(0.40, 0.58, 0.95),
                _ => colors::ACCENT,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: Color::WHITE,
                border: Border {
                    radius: 4.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        })
        .on_press(message)
        .into()
}

/// Centers a dialog panel over the overlay.
fn dialog_frame<'a>(content: Element<'a, Message>, width: f32) -> Element<'a, Message> {
    container(
        container(content)
            .width(Length::Fixed(width))
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_MEDIUM)),
                border: Border {
                    color: colors::BORDER,
                    width: 1.0,
                    radius: 8.0.into(),
                },
                ..Default::default()
            }),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}

impl App {
    pub fn view_modal<'a>(&'a self, modal: &'a Modal) -> Element<'a, Message> {
        match modal {
            Modal::Warning { title, message } => {
                let content = column![
                    text(title.as_str()).size(18).color(colors::WARNING),
                    Space::with_height(8),
                    text(message.as_str()).size(13).color(colors::TEXT_PRIMARY),
                    Space::with_height(20),
                    dialog_button("OK", Message::DismissDialog),
                ]
                .padding(24)
                .align_x(iced::Alignment::Center);

                dialog_frame(content.into(), 380.0)
            }

            Modal::Output {
                title,
                text: output,
                running,
            } => {
                let body = if *running && output.is_empty() {
                    "Running...".to_string()
                } else if output.is_empty() {
                    "(no output)".to_string()
                } else {
                    output.clone()
                };

                let action = if *running {
                    dialog_button("Cancel", Message::CancelRun)
                } else {
                    dialog_button("Close", Message::DismissDialog)
                };

                let content = column![
                    row![
                        text(title.as_str()).size(16).color(colors::ACCENT),
                        horizontal_space(),
                    ],
                    Space::with_height(12),
                    container(
                        scrollable(
                            text(body)
                                .size(13)
                                .font(Font::MONOSPACE)
                                .color(colors::TEXT_PRIMARY)
                        )
                        .height(Length::Fill)
                        .width(Length::Fill)
                    )
                    .padding(8)
                    .height(Length::Fixed(360.0))
                    .style(|_| container::Style {
                        background: Some(Background::Color(colors::BG_DARK)),
                        border: Border {
                            color: colors::BORDER,
                            width: 1.0,
                            radius: 4.0.into(),
                        },
                        ..Default::default()
                    }),
                    Space::with_height(16),
                    row![horizontal_space(), action],
                ]
                .padding(24);

                dialog_frame(content.into(), 640.0)
            }
        }
    }
}

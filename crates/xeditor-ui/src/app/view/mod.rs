pub mod dialogs;
pub mod editor;
pub mod sidebar;
pub mod status;
pub mod toolbar;

use iced::widget::{Space, column, container, mouse_area, row, stack};
use iced::{Background, Element, Length};

use crate::app::{App, Message};
use crate::theme::colors;

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let content = column![
            self.view_toolbar(),
            row![self.view_sidebar(), self.view_main_area()].height(Length::Fill),
            self.view_status_bar(),
        ];

        let main_view: Element<'_, Message> = container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_DARK)),
                ..Default::default()
            })
            .into();

        match &self.modal {
            Some(modal) => stack![
                main_view,
                mouse_area(
                    container(Space::new(Length::Fill, Length::Fill))
                        .width(Length::Fill)
                        .height(Length::Fill)
                        .style(|_| container::Style {
                            background: Some(Background::Color(colors::OVERLAY)),
                            ..Default::default()
                        })
                )
                .on_press(Message::DismissDialog),
                self.view_modal(modal),
            ]
            .into(),
            None => main_view,
        }
    }
}

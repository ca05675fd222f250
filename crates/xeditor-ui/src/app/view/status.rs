use iced::widget::{Space, container, horizontal_space, row, text};
use iced::{Background, Border, Element, Length, Padding};

use xeditor_core::SavePolicy;

use crate::app::{App, Message};
use crate::theme::colors;

impl App {
    /// Last command outcome on the left, document facts on the right.
    pub fn view_status_bar(&self) -> Element<'_, Message> {
        let doc = self.editor.active_document().ok();

        let cursor_info = match doc {
            Some(doc) => {
                let pos = doc.cursor();
                format!("Ln {}, Col {}", pos.line + 1, pos.column + 1)
            }
            None => "Ln 1, Col 1".to_string(),
        };

        let file_info = doc
            .map(|d| {
                if d.is_dirty() {
                    format!("{} [modified]", d.name())
                } else {
                    d.name().to_string()
                }
            })
            .unwrap_or_else(|| "No file".to_string());

        let language_info = doc.map(|d| d.language().tag()).unwrap_or("text");

        let policy_info = match self.editor.save_policy() {
            SavePolicy::Eager => "Auto-save",
            SavePolicy::Debounced { .. } => "Auto-save (delayed)",
            SavePolicy::Manual => "Manual save",
        };

        let status_color = if self.status_message.contains("failed") {
            colors::WARNING
        } else {
            colors::TEXT_SECONDARY
        };

        let status_content = row![
            text(&self.status_message).size(12).color(status_color),
            horizontal_space(),
            text(file_info).size(12).color(colors::TEXT_SECONDARY),
            Space::with_width(24),
            text(cursor_info).size(12).color(colors::TEXT_PRIMARY),
            Space::with_width(24),
            text(language_info).size(12).color(colors::ACCENT),
            Space::with_width(24),
            text(policy_info).size(12).color(colors::TEXT_SECONDARY),
            Space::with_width(12),
        ]
        .padding(Padding::from([6, 12]))
        .align_y(iced::Alignment::Center);

        container(status_content)
            .width(Length::Fill)
            .height(28)
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

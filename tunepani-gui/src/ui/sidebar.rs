//! # Sidebar
//!
//! Saved pieces (save, load, rename, overwrite, delete) and display settings.

use iced::widget::{button, checkbox, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};
use tunepani_core::store::SavedConfiguration;

use crate::{AppDisplayData, Message};

/// Creates the settings sidebar widget.
pub fn create_sidebar(data: &AppDisplayData) -> Element<'static, Message> {
    let save_section = column![
        text("Save Piece").size(18),
        text_input("Piece name", &data.config_name)
            .on_input(Message::ConfigNameChanged)
            .on_submit(Message::SaveConfiguration),
        button(text("Save").size(14).width(Length::Fill))
            .padding([6, 10])
            .on_press(Message::SaveConfiguration),
    ]
    .spacing(8);

    let mut pieces = column![text("Pieces").size(18)].spacing(6);
    if data.configs.is_empty() {
        pieces = pieces.push(text("No saved pieces").size(14));
    }
    for config in &data.configs {
        pieces = pieces.push(make_piece_row(config, data.renaming.as_ref()));
    }

    let settings_section = column![
        text("Settings").size(18),
        checkbox("Dark mode", data.dark_mode).on_toggle(Message::ToggleDarkMode),
    ]
    .spacing(8);

    container(
        column![save_section, Space::with_height(10), pieces, Space::with_height(10), settings_section]
            .spacing(10)
            .padding(15),
    )
    .width(Length::Fixed(280.0))
    .height(Length::Fill)
    .into()
}

/// One saved piece: its name (or a rename field) followed by its actions.
fn make_piece_row(
    config: &SavedConfiguration,
    renaming: Option<&(u64, String)>,
) -> Element<'static, Message> {
    let name: Element<'static, Message> = match renaming {
        Some((id, value)) if *id == config.id => text_input("Piece name", value)
            .on_input(Message::RenameChanged)
            .on_submit(Message::CommitRename)
            .size(14)
            .into(),
        _ => button(text(config.name.clone()).size(14).width(Length::Fill))
            .padding([6, 10])
            .on_press(Message::LoadConfiguration(config.id))
            .into(),
    };

    row![
        container(name).width(Length::Fill),
        small_button("Rename", Message::RenameClicked(config.id)),
        small_button("Save over", Message::OverwriteConfiguration(config.id)),
        small_button("x", Message::DeleteConfiguration(config.id)),
    ]
    .spacing(4)
    .align_y(Alignment::Center)
    .into()
}

fn small_button(label: &'static str, message: Message) -> Element<'static, Message> {
    button(text(label).size(12)).padding([4, 6]).on_press(message).into()
}

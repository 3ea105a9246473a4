//! # Main Display Module
//!
//! Layout of the tuner window: header, pad area, note picker, gauge panel
//! and volume control, with the saved-pieces sidebar on the right when open
//! and the tutorial drawn over everything on first run.

use iced::widget::{button, column, container, horizontal_space, pick_list, row, slider, stack, text, Space};
use iced::{Alignment, Element, Length};
use tunepani_core::notes::NOTE_PICKER;

use super::{gauge, pad_area, sidebar, tutorial};
use crate::{AppDisplayData, Message};

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'static, Message> {
    log::trace!("[VIEW] Rendering GUI...");

    let header = create_header(data);
    let pads = pad_area::PadArea::new(data.pads.clone(), data.pad_area_width).view();

    let mut content = column![header, pads].spacing(10).width(Length::Fill);
    if let Some(picker) = create_note_picker(data) {
        content = content.push(picker);
    }
    content = content.push(create_gauge_panel(data)).push(create_volume_row(data));

    let main_content = if data.menu_open {
        row![content, Space::with_width(10), sidebar::create_sidebar(data)]
    } else {
        row![content]
    }
    .align_y(Alignment::Start)
    .padding(20);

    let base = container(main_content).width(Length::Fill).height(Length::Fill);

    match data.tutorial_step {
        Some(step) => stack![base, tutorial::create_overlay(step)].into(),
        None => base.into(),
    }
}

fn create_header(data: &AppDisplayData) -> Element<'static, Message> {
    let add_button = button(text("+").size(20))
        .padding([4, 12])
        .on_press_maybe((!data.pads_full).then_some(Message::AddPad));

    let mut header = row![
        button(text("Menu").size(14)).padding([6, 10]).on_press(Message::ToggleMenu),
        Space::with_width(10),
        text("Tunepani").size(28),
        horizontal_space(),
    ]
    .align_y(Alignment::Center);

    if !data.output_available {
        header = header.push(text("No audio output").size(14)).push(Space::with_width(10));
    }
    header.push(add_button).into()
}

/// Note picker for the selected pad, or `None` when no pad is selected.
fn create_note_picker(data: &AppDisplayData) -> Option<Element<'static, Message>> {
    data.selected_pad?;

    let selected = data
        .selected_note
        .as_deref()
        .and_then(|note| NOTE_PICKER.iter().copied().find(|n| *n == note));

    let picker = row![
        text("Note").size(16),
        pick_list(NOTE_PICKER.as_slice(), selected, Message::NoteSelected).placeholder("Pick a note"),
        button(text("Done").size(14)).padding([6, 10]).on_press(Message::ClosePicker),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    Some(picker.into())
}

fn create_gauge_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let note_text = data.reading.note.clone().unwrap_or_else(|| "--".to_string());
    let freq_text = if data.reading.note.is_some() {
        format!("{:.2} Hz", data.detected_frequency)
    } else {
        "0.00 Hz".to_string()
    };
    let cents_text = data
        .reading
        .cents
        .map(|c| format!("{:+.0} cents", c))
        .unwrap_or_default();

    let panel = column![
        row![
            text("Detected Note:").size(16),
            Space::with_width(10),
            text(note_text).size(24),
            Space::with_width(10),
            text(freq_text).size(16),
            horizontal_space(),
            text(cents_text).size(16),
        ]
        .align_y(Alignment::Center),
        row![
            text("Flat").size(14),
            Space::with_width(10),
            gauge::TuningGauge::new(data.reading.clone(), data.gauge_scale).view(),
            Space::with_width(10),
            text("Sharp").size(14),
        ]
        .align_y(Alignment::Center),
    ]
    .spacing(10);

    container(panel).padding(15).width(Length::Fill).into()
}

fn create_volume_row(data: &AppDisplayData) -> Element<'static, Message> {
    row![
        text("Volume").size(14),
        slider(0.0..=1.0, data.volume, Message::VolumeChanged).step(0.01_f32),
        text(format!("{:.0}%", data.volume * 100.0)).size(14),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

//! # Tutorial Overlay
//!
//! Dims the window and shows the current walkthrough step with Back and
//! Next/Finish controls.

use iced::widget::{button, center, column, container, horizontal_space, opaque, row, text};
use iced::{Background, Color, Element, Length};
use tunepani_core::tutorial::TUTORIAL_STEPS;

use crate::Message;

/// The overlay for walkthrough `step`.
pub fn create_overlay(step: usize) -> Element<'static, Message> {
    let step = step.min(TUTORIAL_STEPS.len() - 1);
    let is_last = step == TUTORIAL_STEPS.len() - 1;

    let mut controls = row![text(format!("{} / {}", step + 1, TUTORIAL_STEPS.len())).size(12), horizontal_space()]
        .spacing(10);
    if step > 0 {
        controls = controls.push(button(text("Back").size(14)).padding([6, 12]).on_press(Message::TutorialBack));
    }
    let next_label = if is_last { "Finish" } else { "Next" };
    controls = controls.push(button(text(next_label).size(14)).padding([6, 12]).on_press(Message::TutorialNext));

    let card = container(column![text(TUTORIAL_STEPS[step]).size(16), controls].spacing(20))
        .padding(20)
        .max_width(420.0)
        .style(container::rounded_box);

    opaque(
        center(card)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Background::Color(Color { a: 0.6, ..Color::BLACK })),
                ..container::Style::default()
            }),
    )
}

//! # Pad Area Widget
//!
//! Canvas holding the drum pads. Pads are drawn as circles labelled with
//! their note.
//!
//! ## Interaction
//! - Left click: toggle the pad's reference tone
//! - Left drag: move the pad; a trash zone appears at the bottom while dragging
//! - Right click: open the note picker for the pad

use iced::widget::canvas::{self, event, Event, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{alignment, mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme, Vector};
use tunepani_core::pads::{PadId, Rect, PAD_SIZE};

use crate::Message;

/// Height of the pad canvas.
pub const AREA_HEIGHT: f32 = 480.0;
const TRASH_SIZE: f32 = 80.0;
/// Cursor travel before a press becomes a drag.
const DRAG_THRESHOLD: f32 = 5.0;

/// Everything the canvas needs to draw one pad.
#[derive(Debug, Clone, PartialEq)]
pub struct PadView {
    pub id: PadId,
    pub note: String,
    pub x: f32,
    pub y: f32,
    pub sounding: bool,
    pub selected: bool,
}

impl PadView {
    fn center(&self) -> Point {
        Point::new(self.x + PAD_SIZE / 2.0, self.y + PAD_SIZE / 2.0)
    }

    fn contains(&self, point: Point) -> bool {
        self.center().distance(point) <= PAD_SIZE / 2.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    id: PadId,
    /// Cursor offset from the pad's top-left corner.
    grab: Vector,
    start: Point,
    moved: bool,
}

#[derive(Debug, Default)]
pub struct PadAreaState {
    drag: Option<Drag>,
}

pub struct PadArea {
    pads: Vec<PadView>,
    width: f32,
}

impl PadArea {
    pub fn new(pads: Vec<PadView>, width: f32) -> Self {
        Self { pads, width }
    }

    pub fn view(self) -> Element<'static, Message> {
        let width = self.width;
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fixed(width))
                .height(iced::Length::Fixed(AREA_HEIGHT)),
        )
        .into()
    }

    /// Topmost pad under `point`; later pads are drawn above earlier ones.
    fn pad_at(&self, point: Point) -> Option<&PadView> {
        self.pads.iter().rev().find(|pad| pad.contains(point))
    }
}

/// Trash zone, centred along the bottom edge of the area.
pub fn trash_zone(area: Size) -> Rect {
    Rect {
        x: (area.width - TRASH_SIZE) / 2.0,
        y: area.height - TRASH_SIZE - 10.0,
        width: TRASH_SIZE,
        height: TRASH_SIZE,
    }
}

impl canvas::Program<Message> for PadArea {
    type State = PadAreaState;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        // Drags keep tracking outside the canvas, so work in canvas-relative
        // coordinates rather than `position_in`.
        let Some(position) = cursor.position().map(|p| p - Vector::new(bounds.x, bounds.y)) else {
            return (event::Status::Ignored, None);
        };
        let inside = cursor.is_over(bounds);

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) if inside => {
                if let Some(pad) = self.pad_at(position) {
                    state.drag = Some(Drag {
                        id: pad.id,
                        grab: position - Point::new(pad.x, pad.y),
                        start: position,
                        moved: false,
                    });
                    return (event::Status::Captured, None);
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)) if inside => {
                if let Some(pad) = self.pad_at(position) {
                    return (event::Status::Captured, Some(Message::PadSelected(pad.id)));
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let Some(drag) = state.drag.as_mut() {
                    if !drag.moved && drag.start.distance(position) > DRAG_THRESHOLD {
                        drag.moved = true;
                    }
                    if drag.moved {
                        let corner = position - drag.grab;
                        return (event::Status::Captured, Some(Message::PadDragged(drag.id, corner)));
                    }
                    return (event::Status::Captured, None);
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if let Some(drag) = state.drag.take() {
                    let message = if drag.moved {
                        Message::PadDropped {
                            id: drag.id,
                            position: position - drag.grab,
                            trash: trash_zone(bounds.size()),
                        }
                    } else {
                        Message::PadToggled(drag.id)
                    };
                    return (event::Status::Captured, Some(message));
                }
            }
            _ => {}
        }
        (event::Status::Ignored, None)
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let palette = theme.extended_palette();

        if state.drag.is_some_and(|d| d.moved) {
            let trash = trash_zone(bounds.size());
            let zone = Path::rectangle(Point::new(trash.x, trash.y), Size::new(trash.width, trash.height));
            frame.fill(&zone, Color::from_rgba8(0xFF, 0x33, 0x33, 0.25));
            frame.stroke(&zone, Stroke::default().with_width(2.0).with_color(Color::from_rgb8(0xFF, 0x33, 0x33)));
            frame.fill_text(canvas::Text {
                content: "Remove".to_string(),
                position: Point::new(trash.x + trash.width / 2.0, trash.y + trash.height / 2.0),
                color: Color::from_rgb8(0xFF, 0x33, 0x33),
                size: iced::Pixels(14.0),
                horizontal_alignment: alignment::Horizontal::Center,
                vertical_alignment: alignment::Vertical::Center,
                ..canvas::Text::default()
            });
        }

        for pad in &self.pads {
            let color = if pad.sounding {
                Color::from_rgb8(0x34, 0xDB, 0x98) // Green
            } else {
                palette.primary.base.color
            };

            let circle = Path::circle(pad.center(), PAD_SIZE / 2.0);
            frame.fill(&circle, color);
            if pad.selected {
                frame.stroke(&circle, Stroke::default().with_width(3.0).with_color(Color::from_rgb8(0xFF, 0xC3, 0x00)));
            }

            frame.fill_text(canvas::Text {
                content: pad.note.clone(),
                position: pad.center(),
                color: Color::WHITE,
                size: iced::Pixels(11.0),
                horizontal_alignment: alignment::Horizontal::Center,
                vertical_alignment: alignment::Vertical::Center,
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag.is_some_and(|d| d.moved) {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(position) if self.pad_at(position).is_some() => mouse::Interaction::Pointer,
            _ => mouse::Interaction::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(id: u64, x: f32, y: f32) -> PadView {
        PadView { id: PadId(id), note: "E3".into(), x, y, sounding: false, selected: false }
    }

    #[test]
    fn test_hit_testing_prefers_topmost() {
        let area = PadArea::new(vec![pad(1, 100.0, 100.0), pad(2, 120.0, 100.0)], 600.0);
        assert_eq!(area.pad_at(Point::new(145.0, 130.0)).unwrap().id, PadId(2));
        assert_eq!(area.pad_at(Point::new(105.0, 130.0)).unwrap().id, PadId(1));
        // Corner of the bounding square lies outside the circle.
        assert!(area.pad_at(Point::new(101.0, 101.0)).is_none());
    }

    #[test]
    fn test_trash_zone_sits_at_bottom_centre() {
        let zone = trash_zone(Size::new(600.0, 480.0));
        assert_eq!(zone.x, 260.0);
        assert_eq!(zone.y + zone.height, 470.0);

        let dropped = tunepani_core::pads::Pad { id: PadId(1), note: "E3".into(), x: 270.0, y: 390.0 };
        assert!(dropped.overlaps(&zone));
    }
}

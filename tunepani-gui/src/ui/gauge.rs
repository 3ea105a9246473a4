//! # Tuning Gauge Widget
//!
//! Horizontal flat/sharp gauge. The marker position comes from a
//! `GaugeReading` in gauge coordinates and is scaled to the canvas width.

use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};
use tunepani_core::gauge::{GaugeReading, GaugeScale};

const MARKER_WIDTH: f32 = 4.0;

pub struct TuningGauge {
    reading: GaugeReading,
    scale: GaugeScale,
}

impl TuningGauge {
    pub fn new(reading: GaugeReading, scale: GaugeScale) -> Self {
        Self { reading, scale }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(40.0)),
        )
        .into()
    }

    /// Horizontal canvas position of the marker.
    fn marker_x(&self, width: f32) -> f32 {
        let full = 2.0 * self.scale.half_width;
        if full <= 0.0 {
            return width / 2.0;
        }
        let left = self.scale.center - self.scale.half_width;
        ((self.reading.marker - left) / full * width).clamp(0.0, width)
    }
}

impl<Message> canvas::Program<Message> for TuningGauge {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let background = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&background, Color::from_rgb8(0x40, 0x40, 0x40));

        // In-tune line
        let center_x = bounds.width / 2.0;
        let center_line = Path::line(Point::new(center_x, 0.0), Point::new(center_x, bounds.height));
        frame.stroke(&center_line, Stroke::default().with_width(2.0).with_color(Color::WHITE));

        let color = match self.reading.cents {
            Some(c) if c.abs() < 5.0 => Color::from_rgb8(0x34, 0xDB, 0x98), // Green
            Some(c) if c.abs() < 20.0 => Color::from_rgb8(0xFF, 0xC3, 0x00), // Yellow
            Some(_) => Color::from_rgb8(0xFF, 0x33, 0x33),                   // Red
            None => Color::from_rgb8(0x90, 0x90, 0x90),
        };

        let marker_x = self.marker_x(bounds.width);
        let marker = Path::rectangle(
            Point::new(marker_x - MARKER_WIDTH / 2.0, 0.0),
            Size::new(MARKER_WIDTH, bounds.height),
        );
        frame.fill(&marker, color);

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_scaling() {
        let scale = GaugeScale::default();
        let gauge = |marker: f32| TuningGauge::new(GaugeReading { marker, cents: None, note: None }, scale);

        assert_eq!(gauge(100.0).marker_x(300.0), 150.0);
        assert_eq!(gauge(0.0).marker_x(300.0), 0.0);
        assert_eq!(gauge(200.0).marker_x(300.0), 300.0);
        assert_eq!(gauge(250.0).marker_x(300.0), 300.0);
    }
}

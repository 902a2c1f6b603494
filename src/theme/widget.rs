//! Helper functions for creating text on the playfield.

use bevy::{prelude::*, sprite::Anchor, text::LineHeight};

use crate::{game::playfield::to_world, theme::palette::AMBER};

/// Text drawn above sprites.
const TEXT_Z: f32 = 10.0;

/// A centered amber line (or lines) of text.
pub fn label(text: impl Into<String>, font: Handle<Font>, size: f32) -> impl Bundle {
    (
        Name::new("Label"),
        Text2d::new(text),
        TextFont {
            font,
            font_size: size,
            ..default()
        },
        TextColor(AMBER),
        TextLayout::new_with_justify(Justify::Center),
    )
}

/// A left aligned block of amber text.
pub fn paragraph(text: impl Into<String>, font: Handle<Font>, size: f32) -> impl Bundle {
    (
        Name::new("Paragraph"),
        Text2d::new(text),
        TextFont {
            font,
            font_size: size,
            line_height: LineHeight::RelativeToFont(1.3),
            ..default()
        },
        TextColor(AMBER),
        TextLayout::new_with_justify(Justify::Left),
    )
}

/// Pin a text's `anchor` point to a playfield position.
pub fn placed(point: Vec2, anchor: Anchor) -> impl Bundle {
    (Transform::from_translation(to_world(point, TEXT_Z)), anchor)
}

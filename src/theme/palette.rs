use bevy::prelude::*;

/// Black backdrop behind every screen.
pub const BACKGROUND: Color = Color::srgb(0.0, 0.0, 0.0);

/// #ffbf00, used for all text, the playfield border and the speed meter.
pub const AMBER: Color = Color::srgb(1.0, 0.749, 0.0);

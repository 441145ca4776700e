//! Presentation hints: status marks and per-file colours.

/// Status mark shown for a message or context in a file column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationMark {
    /// Finished
    On,
    /// Unfinished but translated
    Off,
    Obsolete,
    /// Unfinished with a failed check
    Danger,
    /// Finished with a failed check
    Warning,
    /// Unfinished without translation
    Empty,
}

impl TranslationMark {
    pub fn name(self) -> &'static str {
        match self {
            TranslationMark::On => "on",
            TranslationMark::Off => "off",
            TranslationMark::Obsolete => "obsolete",
            TranslationMark::Danger => "danger",
            TranslationMark::Warning => "warning",
            TranslationMark::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Darker shade; `factor` 108 gives about 93% brightness.
    pub fn darker(self, factor: u32) -> Self {
        if factor == 0 {
            return self;
        }
        let scale = |c: u8| (u32::from(c) * 100 / factor).min(255) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Text colour of obsolete entries
pub const OBSOLETE_FOREGROUND: Rgb = Rgb::new(128, 128, 128);
/// Text colour of unnamed contexts and comment pseudo-messages
pub const UNNAMED_FOREGROUND: Rgb = Rgb::new(0, 0xa0, 0xa0);

/// Background colours cycled through the open files
pub const FILE_PALETTE: [Rgb; 7] = [
    Rgb::new(236, 244, 255), // blue
    Rgb::new(236, 255, 255), // cyan
    Rgb::new(236, 255, 232), // green
    Rgb::new(255, 255, 230), // yellow
    Rgb::new(255, 242, 222), // orange
    Rgb::new(255, 236, 236), // red
    Rgb::new(252, 236, 255), // purple
];

/// Background of a file column. Read-only files are drawn with a
/// checkered texture on top of the colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelBrush {
    pub color: Rgb,
    pub textured: bool,
}

impl ModelBrush {
    pub fn for_model(model: usize, writable: bool) -> Self {
        ModelBrush {
            color: FILE_PALETTE[model % FILE_PALETTE.len()],
            textured: !writable,
        }
    }

    pub fn darker(self, factor: u32) -> Self {
        ModelBrush {
            color: self.color.darker(factor),
            ..self
        }
    }
}

/// Whether pixel (x, y) of the 8x8 read-only texture is set
pub fn texture_pixel(x: usize, y: usize) -> bool {
    ((x % 8) + (y % 8)) & 4 != 0
}

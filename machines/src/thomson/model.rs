use std::fmt;
use std::str::FromStr;

use crate::rom_loader::RomImage;

/// The emulated Thomson models. The discriminant is the id stored in save states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Model {
    To8 = 0,
    To8d = 1,
    To9 = 2,
    To9p = 3,
    Mo5 = 4,
    Mo6 = 5,
    Pc128 = 6,
    To7 = 7,
    To770 = 8,
}

/// Memory map family. One read/write implementation serves each family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    /// TO8, TO8D, TO9, TO9+: gate array mode page at 0xE7DA-0xE7E7.
    To,
    /// TO7, TO7/70: cartridge slot and 8x8 keyboard matrix.
    To7,
    /// MO5, MO6, PC128: system PIA at 0xA7C0, monitor at 0xF000.
    Mo,
}

/// ROM images making up a model.
pub struct RomLayout {
    /// BASIC and embedded software banks.
    pub basic: Option<RomImage>,
    pub monitor: RomImage,
    /// MO floppy controller ROM, mapped at 0xA000-0xA7BF. Optional.
    pub disk: Option<RomImage>,
    /// Built-in MEMO7 cartridge of the TO7 family.
    pub cartridge: Option<RomImage>,
}

const CD90_640: RomImage = RomImage::new("cd90_640.rom", 0x800);

static TO8_ROMS: RomLayout = RomLayout {
    basic: Some(RomImage::new("to8_basic.rom", 0x10000)),
    monitor: RomImage::new("to8_monitor.rom", 0x4000),
    disk: None,
    cartridge: None,
};

static TO8D_ROMS: RomLayout = RomLayout {
    basic: Some(RomImage::new("to8_basic.rom", 0x10000)),
    monitor: RomImage::new("to8d_monitor.rom", 0x4000),
    disk: None,
    cartridge: None,
};

static TO9_ROMS: RomLayout = RomLayout {
    basic: Some(RomImage::new("to9_basic.rom", 0x20000)),
    monitor: RomImage::new("to9_monitor.rom", 0x2000),
    disk: None,
    cartridge: None,
};

static TO9P_ROMS: RomLayout = RomLayout {
    basic: Some(RomImage::new("to9p_basic.rom", 0x10000)),
    monitor: RomImage::new("to9p_monitor.rom", 0x4000),
    disk: None,
    cartridge: None,
};

static MO5_ROMS: RomLayout = RomLayout {
    basic: Some(RomImage::new("mo5_basic.rom", 0x3000)),
    monitor: RomImage::new("mo5_monitor.rom", 0x1000),
    disk: Some(CD90_640),
    cartridge: None,
};

static MO6_ROMS: RomLayout = RomLayout {
    basic: Some(RomImage::new("mo6_basic128.rom", 0x8000)),
    monitor: RomImage::new("mo6_basic1.rom", 0x8000),
    disk: Some(CD90_640),
    cartridge: None,
};

static PC128_ROMS: RomLayout = RomLayout {
    basic: Some(RomImage::new("pc128_basic128.rom", 0x8000)),
    monitor: RomImage::new("pc128_basic1.rom", 0x8000),
    disk: Some(CD90_640),
    cartridge: None,
};

static TO7_ROMS: RomLayout = RomLayout {
    basic: None,
    monitor: RomImage::new("to7_monitor.rom", 0x1800),
    disk: None,
    cartridge: Some(RomImage::new("basic1_memo7.rom", 0x4000)),
};

static TO770_ROMS: RomLayout = RomLayout {
    basic: None,
    monitor: RomImage::new("to770_monitor.rom", 0x1800),
    disk: None,
    cartridge: Some(RomImage::new("basic128_memo7.rom", 0x10000)),
};

impl Model {
    pub const ALL: [Model; 9] = [
        Model::To8,
        Model::To8d,
        Model::To9,
        Model::To9p,
        Model::Mo5,
        Model::Mo6,
        Model::Pc128,
        Model::To7,
        Model::To770,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(id).ok()?).copied()
    }

    /// Name used on the command line and in the registry.
    pub const fn cli_name(self) -> &'static str {
        match self {
            Model::To8 => "to8",
            Model::To8d => "to8d",
            Model::To9 => "to9",
            Model::To9p => "to9p",
            Model::Mo5 => "mo5",
            Model::Mo6 => "mo6",
            Model::Pc128 => "pc128",
            Model::To7 => "to7",
            Model::To770 => "to770",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Model::To8 => "TO8",
            Model::To8d => "TO8D",
            Model::To9 => "TO9",
            Model::To9p => "TO9+",
            Model::Mo5 => "MO5",
            Model::Mo6 => "MO6",
            Model::Pc128 => "PC128",
            Model::To7 => "TO7",
            Model::To770 => "TO7/70",
        }
    }

    pub fn family(self) -> Family {
        match self {
            Model::To8 | Model::To8d | Model::To9 | Model::To9p => Family::To,
            Model::To7 | Model::To770 => Family::To7,
            Model::Mo5 | Model::Mo6 | Model::Pc128 => Family::Mo,
        }
    }

    pub fn is_mo(self) -> bool {
        self.family() == Family::Mo
    }

    /// MO6 and its Olivetti twin, the PC128.
    pub fn is_mo6(self) -> bool {
        matches!(self, Model::Mo6 | Model::Pc128)
    }

    pub fn rom_layout(self) -> &'static RomLayout {
        match self {
            Model::To8 => &TO8_ROMS,
            Model::To8d => &TO8D_ROMS,
            Model::To9 => &TO9_ROMS,
            Model::To9p => &TO9P_ROMS,
            Model::Mo5 => &MO5_ROMS,
            Model::Mo6 => &MO6_ROMS,
            Model::Pc128 => &PC128_ROMS,
            Model::To7 => &TO7_ROMS,
            Model::To770 => &TO770_ROMS,
        }
    }

    /// Whether hard reset writes today's date into the BASIC ROM.
    pub fn has_date_patch(self) -> bool {
        matches!(self, Model::To8 | Model::To8d | Model::To9p)
    }

    /// Guess the model from a media file name. The longer names are tried
    /// first so "to8d" is not taken for "to8".
    pub fn detect(file_name: &str) -> Option<Self> {
        let name = file_name.to_ascii_lowercase();
        [
            ("to8d", Model::To8d),
            ("to8", Model::To8),
            ("to9p", Model::To9p),
            ("to9", Model::To9),
            ("mo5", Model::Mo5),
        ]
        .into_iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map(|(_, model)| model)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Accepts the CLI names as well as the case names ("TO9+", "TO7/70").
impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.cli_name().eq_ignore_ascii_case(s) || m.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown model '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for model in Model::ALL {
            assert_eq!(Model::from_id(model.id()), Some(model));
        }
        assert_eq!(Model::from_id(9), None);
        assert_eq!(Model::from_id(-1), None);
    }

    #[test]
    fn detect_prefers_longer_names() {
        assert_eq!(Model::detect("Game_TO8D.fd"), Some(Model::To8d));
        assert_eq!(Model::detect("game-to8.k7"), Some(Model::To8));
        assert_eq!(Model::detect("demo (TO9P).sap"), Some(Model::To9p));
        assert_eq!(Model::detect("x_to9.fd"), Some(Model::To9));
        assert_eq!(Model::detect("arkanoid_mo5.k7"), Some(Model::Mo5));
        assert_eq!(Model::detect("unknown.k7"), None);
    }

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!("TO9+".parse::<Model>(), Ok(Model::To9p));
        assert_eq!("to770".parse::<Model>(), Ok(Model::To770));
        assert_eq!("TO7/70".parse::<Model>(), Ok(Model::To770));
        assert!("amiga".parse::<Model>().is_err());
    }

    #[test]
    fn families() {
        assert_eq!(Model::Pc128.family(), Family::Mo);
        assert!(Model::Pc128.is_mo6());
        assert!(!Model::Mo5.is_mo6());
        assert_eq!(Model::To770.family(), Family::To7);
        assert_eq!(Model::To9p.family(), Family::To);
    }
}

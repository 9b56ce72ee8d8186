//! Model registry for front-end discovery.
//!
//! Each Thomson model self-registers via [`inventory::submit!`] with a
//! [`MachineEntry`] holding its CLI name, display name and a factory. The
//! front-end lists and selects models without a central table.

use moto_core::core::machine::Machine;

use crate::rom_loader::{RomLoadError, RomSet};
use crate::thomson::Model;

/// Describes one selectable model.
pub struct MachineEntry {
    /// CLI name used to select the model (e.g., "to8d").
    pub name: &'static str,
    /// Name as printed on the case (e.g., "TO9+").
    pub display_name: &'static str,
    pub model: Model,
    /// Factory: construct the machine from a ROM set.
    pub create: fn(&RomSet) -> Result<Box<dyn Machine>, RomLoadError>,
}

impl MachineEntry {
    pub const fn new(
        name: &'static str,
        display_name: &'static str,
        model: Model,
        create: fn(&RomSet) -> Result<Box<dyn Machine>, RomLoadError>,
    ) -> Self {
        Self {
            name,
            display_name,
            model,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// All registered models, in model id order.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.model.id());
    entries
}

/// Look up a model by CLI name (case-insensitive).
pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
}

//! In-memory design context.
//!
//! [`DesignContext`] records which cells occupy which bels and which nets
//! use which wires and pips. It is the object scripts see as `ctx`. All maps
//! are ordered by identifier so [`DesignContext::snapshot`] is deterministic.

use std::collections::BTreeMap;

use pnr_core::{ArchNetInfo, BelId, PipId, PipMapping, PlaceStrength, WireId};
use serde::Serialize;

use crate::error::ContextError;

/// Owner and strength of one resource assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Cell name for bels, net name for wires and pips.
    pub owner: String,
    /// Strength the assignment was made at.
    pub strength: PlaceStrength,
}

/// Placement and routing state of one design.
#[derive(Debug, Clone, Default)]
pub struct DesignContext {
    name: String,
    arch: String,
    bels: BTreeMap<BelId, Binding>,
    wires: BTreeMap<WireId, Binding>,
    pips: BTreeMap<PipId, Binding>,
    nets: BTreeMap<String, ArchNetInfo>,
    settings: BTreeMap<String, String>,
}

impl DesignContext {
    /// Empty context for design `name` on fabric family `arch`.
    pub fn new(name: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arch: arch.into(),
            ..Self::default()
        }
    }

    /// Design name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the design.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Fabric family name.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    // =========================================================================
    // Bels
    // =========================================================================

    /// Place `cell` on `bel`.
    ///
    /// Rebinding a bel to the cell that already holds it updates the strength.
    pub fn bind_bel(
        &mut self,
        bel: BelId,
        cell: &str,
        strength: PlaceStrength,
    ) -> Result<(), ContextError> {
        if cell.is_empty() {
            return Err(ContextError::EmptyName { kind: "cell" });
        }
        if let Some(held) = self.bels.get(&bel) {
            if held.owner != cell {
                return Err(ContextError::BelUnavailable {
                    bel,
                    cell: held.owner.clone(),
                });
            }
        }
        tracing::debug!(%bel, cell, %strength, "bind bel");
        self.bels.insert(
            bel,
            Binding {
                owner: cell.to_string(),
                strength,
            },
        );
        Ok(())
    }

    /// Remove the cell from `bel`, returning its binding.
    pub fn unbind_bel(&mut self, bel: BelId) -> Option<Binding> {
        self.bels.remove(&bel)
    }

    /// Cell placed on `bel`.
    pub fn bel_cell(&self, bel: BelId) -> Option<&str> {
        self.bels.get(&bel).map(|b| b.owner.as_str())
    }

    /// Strength of the placement on `bel`.
    pub fn bel_strength(&self, bel: BelId) -> Option<PlaceStrength> {
        self.bels.get(&bel).map(|b| b.strength)
    }

    /// True when no cell is placed on `bel`.
    pub fn is_bel_available(&self, bel: BelId) -> bool {
        !self.bels.contains_key(&bel)
    }

    // =========================================================================
    // Wires
    // =========================================================================

    /// Assign `wire` to `net`. Same rules as [`DesignContext::bind_bel`].
    pub fn bind_wire(
        &mut self,
        wire: WireId,
        net: &str,
        strength: PlaceStrength,
    ) -> Result<(), ContextError> {
        if net.is_empty() {
            return Err(ContextError::EmptyName { kind: "net" });
        }
        if let Some(held) = self.wires.get(&wire) {
            if held.owner != net {
                return Err(ContextError::WireUnavailable {
                    wire,
                    net: held.owner.clone(),
                });
            }
        }
        tracing::debug!(%wire, net, %strength, "bind wire");
        self.wires.insert(
            wire,
            Binding {
                owner: net.to_string(),
                strength,
            },
        );
        Ok(())
    }

    /// Remove the net from `wire`, returning its binding.
    pub fn unbind_wire(&mut self, wire: WireId) -> Option<Binding> {
        self.wires.remove(&wire)
    }

    /// Net bound to `wire`.
    pub fn wire_net(&self, wire: WireId) -> Option<&str> {
        self.wires.get(&wire).map(|b| b.owner.as_str())
    }

    /// True when no net is bound to `wire`.
    pub fn is_wire_available(&self, wire: WireId) -> bool {
        !self.wires.contains_key(&wire)
    }

    // =========================================================================
    // Pips
    // =========================================================================

    /// Assign `pip` to `net`, ripping up any weaker or equal assignment.
    ///
    /// Returns the binding that was replaced, if any.
    pub fn bind_pip(
        &mut self,
        pip: PipId,
        net: &str,
        strength: PlaceStrength,
    ) -> Result<Option<Binding>, ContextError> {
        if net.is_empty() {
            return Err(ContextError::EmptyName { kind: "net" });
        }
        if let Some(held) = self.pips.get(&pip) {
            if !strength.overrides(held.strength) {
                return Err(ContextError::PipHeld {
                    pip,
                    held: held.strength,
                    requested: strength,
                });
            }
        }
        let previous = self.pips.insert(
            pip,
            Binding {
                owner: net.to_string(),
                strength,
            },
        );
        if let Some(prev) = &previous {
            if prev.owner != net {
                tracing::info!(%pip, from = %prev.owner, to = net, "ripped up pip");
            }
        }
        Ok(previous)
    }

    /// Remove the net from `pip`, returning its binding.
    pub fn unbind_pip(&mut self, pip: PipId) -> Option<Binding> {
        self.pips.remove(&pip)
    }

    /// Net routed through `pip`.
    pub fn pip_net(&self, pip: PipId) -> Option<&str> {
        self.pips.get(&pip).map(|b| b.owner.as_str())
    }

    /// `pip` paired with its binding strength.
    pub fn pip_mapping(&self, pip: PipId) -> Option<PipMapping> {
        self.pips
            .get(&pip)
            .map(|b| PipMapping::new(pip, b.strength))
    }

    /// Strength of the binding on `pip`.
    pub fn pip_strength(&self, pip: PipId) -> Option<PlaceStrength> {
        self.pips.get(&pip).map(|b| b.strength)
    }

    // =========================================================================
    // Nets and settings
    // =========================================================================

    /// Mark `net` as global routing, or clear the mark.
    pub fn set_net_global(&mut self, net: &str, is_global: bool) {
        self.nets.entry(net.to_string()).or_default().is_global = is_global;
    }

    /// Annotations of `net`; an unannotated net reports the default.
    pub fn net_info(&self, net: &str) -> ArchNetInfo {
        self.nets.get(net).copied().unwrap_or_default()
    }

    /// Store a free-form design setting.
    pub fn set_setting(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    /// Value of setting `key`.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Serializable copy of every binding, in identifier order.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            name: self.name.clone(),
            arch: self.arch.clone(),
            bels: self
                .bels
                .iter()
                .map(|(bel, b)| BelEntry {
                    bel: *bel,
                    cell: b.owner.clone(),
                    strength: b.strength,
                })
                .collect(),
            wires: self
                .wires
                .iter()
                .map(|(wire, b)| WireEntry {
                    wire: *wire,
                    net: b.owner.clone(),
                    strength: b.strength,
                })
                .collect(),
            pips: self
                .pips
                .iter()
                .map(|(pip, b)| PipEntry {
                    pip: *pip,
                    net: b.owner.clone(),
                    strength: b.strength,
                })
                .collect(),
            nets: self.nets.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// Point-in-time view of a [`DesignContext`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnapshot {
    /// Design name.
    pub name: String,
    /// Fabric family name.
    pub arch: String,
    /// Placed bels in identifier order.
    pub bels: Vec<BelEntry>,
    /// Bound wires in identifier order.
    pub wires: Vec<WireEntry>,
    /// Bound pips in identifier order.
    pub pips: Vec<PipEntry>,
    /// Net annotations by name.
    pub nets: BTreeMap<String, ArchNetInfo>,
    /// Design settings by key.
    pub settings: BTreeMap<String, String>,
}

/// One placed bel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BelEntry {
    /// Bel identifier.
    pub bel: BelId,
    /// Placed cell.
    pub cell: String,
    /// Placement strength.
    pub strength: PlaceStrength,
}

/// One bound wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireEntry {
    /// Wire identifier.
    pub wire: WireId,
    /// Bound net.
    pub net: String,
    /// Binding strength.
    pub strength: PlaceStrength,
}

/// One bound pip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipEntry {
    /// Pip identifier.
    pub pip: PipId,
    /// Routed net.
    pub net: String,
    /// Binding strength.
    pub strength: PlaceStrength,
}

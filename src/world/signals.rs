/// Fire output at one site: the latest severity and the step it was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FireSignal {
    pub severity: u8,
    pub last_changed: u32,
}

/// Harvest output at one site: the latest prescription and the step it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestSignal {
    pub prescription: Option<String>,
    pub last_changed: u32,
}

/// Per-site disturbance layers published by fire and harvest models.
///
/// A layer is `None` when no model producing it is part of the run, which is
/// different from a layer where nothing has burned or been cut yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisturbanceSignals {
    pub fire: Option<Vec<FireSignal>>,
    pub harvest: Option<Vec<HarvestSignal>>,
}

impl DisturbanceSignals {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_fire(mut self, site_count: usize) -> Self {
        self.fire = Some(vec![FireSignal::default(); site_count]);
        self
    }

    pub fn with_harvest(mut self, site_count: usize) -> Self {
        self.harvest = Some(vec![HarvestSignal::default(); site_count]);
        self
    }

    pub fn has_fire(&self) -> bool {
        self.fire.is_some()
    }

    pub fn has_harvest(&self) -> bool {
        self.harvest.is_some()
    }

    pub fn fire_at(&self, site: usize) -> Option<&FireSignal> {
        self.fire.as_ref().and_then(|layer| layer.get(site))
    }

    pub fn harvest_at(&self, site: usize) -> Option<&HarvestSignal> {
        self.harvest.as_ref().and_then(|layer| layer.get(site))
    }

    /// Record a fire at `site`. No-op when the fire layer is absent.
    pub fn set_fire(&mut self, site: usize, severity: u8, step: u32) {
        if let Some(signal) = self.fire.as_mut().and_then(|layer| layer.get_mut(site)) {
            signal.severity = severity;
            signal.last_changed = step;
        }
    }

    /// Record a harvest at `site`. No-op when the harvest layer is absent.
    pub fn set_harvest(&mut self, site: usize, prescription: &str, step: u32) {
        if let Some(signal) = self.harvest.as_mut().and_then(|layer| layer.get_mut(site)) {
            signal.prescription = Some(prescription.to_string());
            signal.last_changed = step;
        }
    }
}

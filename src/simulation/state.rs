use crate::simulation::definition::DisturbanceType;

/// A value and the value it held one step earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct History<T> {
    current: T,
    previous: T,
}

impl<T: Copy> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            previous: initial,
        }
    }

    pub fn current(&self) -> T {
        self.current
    }

    pub fn previous(&self) -> T {
        self.previous
    }

    /// Shift `current` into `previous` and store `next`.
    pub fn advance(&mut self, next: T) {
        self.previous = self.current;
        self.current = next;
    }
}

/// Disturbance bookkeeping for one disturbance kind at one site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DisturbanceRecord {
    #[default]
    NoDisturbanceRecorded,
    /// The most recent qualifying event. `age` and `forest_type` are the
    /// site's values from the step before the event.
    Recorded {
        year: u32,
        age: u32,
        forest_type: usize,
        weight: f64,
    },
}

impl DisturbanceRecord {
    pub fn is_recorded(&self) -> bool {
        matches!(self, DisturbanceRecord::Recorded { .. })
    }

    pub fn year(&self) -> Option<u32> {
        match self {
            DisturbanceRecord::Recorded { year, .. } => Some(*year),
            DisturbanceRecord::NoDisturbanceRecorded => None,
        }
    }

    /// Steps elapsed since the recorded event, `None` if nothing was recorded.
    pub fn time_since(&self, current_time: u32) -> Option<u32> {
        self.year().map(|year| current_time.saturating_sub(year))
    }
}

/// Per-site, per-definition state carried across steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationState {
    pub dominant_age: History<u32>,
    /// 1-based forest-type index, 0 for none.
    pub forest_type: History<usize>,
    pub fire: DisturbanceRecord,
    pub harvest: DisturbanceRecord,
    pub suitability: f64,
}

impl LocationState {
    pub fn record(&self, kind: DisturbanceType) -> &DisturbanceRecord {
        match kind {
            DisturbanceType::Fire => &self.fire,
            DisturbanceType::Harvest => &self.harvest,
        }
    }

    pub fn record_mut(&mut self, kind: DisturbanceType) -> &mut DisturbanceRecord {
        match kind {
            DisturbanceType::Fire => &mut self.fire,
            DisturbanceType::Harvest => &mut self.harvest,
        }
    }

    pub fn is_disturbed(&self) -> bool {
        self.fire.is_recorded() || self.harvest.is_recorded()
    }
}

/// Location states of one definition, indexed by site and created on first use.
#[derive(Debug, Clone, Default)]
pub struct SiteStates {
    sites: Vec<Option<LocationState>>,
}

impl SiteStates {
    pub fn get(&self, site: usize) -> Option<&LocationState> {
        self.sites.get(site).and_then(Option::as_ref)
    }

    pub fn get_or_create(&mut self, site: usize) -> &mut LocationState {
        if site >= self.sites.len() {
            self.sites.resize(site + 1, None);
        }
        self.sites[site].get_or_insert_with(LocationState::default)
    }

    /// Stored suitability, 0 for sites never processed.
    pub fn suitability(&self, site: usize) -> f64 {
        self.get(site).map(|s| s.suitability).unwrap_or(0.0)
    }
}

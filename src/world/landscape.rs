use crate::world::cohort::{CohortMode, SiteCohorts};

/// One grid cell of the landscape.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub active: bool,
    pub cohorts: SiteCohorts,
}

/// A rectangular grid of sites stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    rows: u32,
    cols: u32,
    cohort_mode: CohortMode,
    sites: Vec<Site>,
}

impl Landscape {
    /// All sites active and without cohorts.
    pub fn new(rows: u32, cols: u32, cohort_mode: CohortMode, species_count: usize) -> Self {
        let mut sites = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                sites.push(Site {
                    index: sites.len(),
                    row,
                    col,
                    active: true,
                    cohorts: SiteCohorts::new(species_count),
                });
            }
        }
        Self {
            rows,
            cols,
            cohort_mode,
            sites,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cohort_mode(&self) -> CohortMode {
        self.cohort_mode
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn site(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    pub fn site_mut(&mut self, index: usize) -> Option<&mut Site> {
        self.sites.get_mut(index)
    }

    /// Every site in row-major order, active or not.
    pub fn all_sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter()
    }

    pub fn all_sites_mut(&mut self) -> impl Iterator<Item = &mut Site> {
        self.sites.iter_mut()
    }

    pub fn active_sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter().filter(|s| s.active)
    }

    pub fn active_count(&self) -> usize {
        self.sites.iter().filter(|s| s.active).count()
    }
}

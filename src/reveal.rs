#[derive(Debug, Clone, Copy, PartialEq)]
struct Observed<Id> {
    id: Id,
    top: f32,
    height: f32,
}

/// Reports each element once, the first time it intersects the viewport
/// with `threshold` of its height trimmed off the bottom.
#[derive(Debug, Clone)]
pub struct RevealTracker<Id> {
    threshold: f32,
    observed: Vec<Observed<Id>>,
}

/// Fraction of the viewport height trimmed from the bottom by default.
pub const DEFAULT_REVEAL_THRESHOLD: f32 = 0.15;

impl<Id: Copy + PartialEq> Default for RevealTracker<Id> {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_THRESHOLD)
    }
}

impl<Id: Copy + PartialEq> RevealTracker<Id> {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            observed: Vec::new(),
        }
    }

    pub fn observe(&mut self, id: Id, top: f32, height: f32) {
        let entry = Observed {
            id,
            top,
            height: height.max(0.0),
        };
        match self.observed.iter_mut().find(|o| o.id == id) {
            Some(existing) => *existing = entry,
            None => self.observed.push(entry),
        }
    }

    pub fn pending(&self) -> usize {
        self.observed.len()
    }

    pub fn is_observing(&self, id: Id) -> bool {
        self.observed.iter().any(|o| o.id == id)
    }

    /// Returns the ids that became visible for the first time and stops
    /// observing them.
    pub fn update(&mut self, scroll_y: f32, viewport_height: f32) -> Vec<Id> {
        let band_top = scroll_y;
        let band_bottom = scroll_y + viewport_height * (1.0 - self.threshold);
        let mut revealed = Vec::new();

        self.observed.retain(|o| {
            let visible = o.top < band_bottom && o.top + o.height > band_top;
            if visible {
                revealed.push(o.id);
            }
            !visible
        });

        if !revealed.is_empty() {
            log::debug!("revealed {} element(s) at scroll {scroll_y}", revealed.len());
        }
        revealed
    }
}

use crate::models::RawFix;

/// Ringbuffer med fast kapasitet for vektet glidende snitt av fixes.
///
/// Plassene allokeres én gang ved konstruksjon; når bufferet er fullt
/// overskrives eldste element. `len() <= capacity()` holder alltid.
#[derive(Debug, Clone)]
pub struct WeightedWindow {
    slots: Vec<Option<RawFix>>,
    head: usize, // indeks til eldste element
    len: usize,
}

impl WeightedWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { slots: vec![None; capacity], head: 0, len: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        for s in self.slots.iter_mut() {
            *s = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Tøm og legg inn `fix` som eneste element.
    pub fn seed(&mut self, fix: RawFix) {
        self.clear();
        self.push(fix);
    }

    pub fn push(&mut self, fix: RawFix) {
        let cap = self.capacity();
        if self.len < cap {
            let idx = (self.head + self.len) % cap;
            self.slots[idx] = Some(fix);
            self.len += 1;
        } else {
            // fullt: overskriv eldste og flytt head
            self.slots[self.head] = Some(fix);
            self.head = (self.head + 1) % cap;
        }
    }

    /// Eldste først.
    pub fn iter(&self) -> impl Iterator<Item = &RawFix> + '_ {
        let cap = self.capacity();
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % cap].as_ref())
    }

    pub fn latest(&self) -> Option<&RawFix> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.len - 1) % self.capacity();
        self.slots[idx].as_ref()
    }

    /// Vektet snitt: element i (0 = eldste) har vekt i+1.
    /// Lat/lon snittes; øvrige felt kopieres fra nyeste fix.
    pub fn weighted_average(&self) -> Option<RawFix> {
        let latest = *self.latest()?;

        let mut w_sum = 0.0;
        let mut lat = 0.0;
        let mut lon = 0.0;
        for (i, f) in self.iter().enumerate() {
            let w = (i + 1) as f64;
            lat += f.latitude * w;
            lon += f.longitude * w;
            w_sum += w;
        }

        Some(RawFix {
            latitude: lat / w_sum,
            longitude: lon / w_sum,
            ..latest
        })
    }
}

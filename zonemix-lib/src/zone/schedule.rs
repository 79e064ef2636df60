//! Shuffled play order.

use rand::Rng;

/// Permutation of a zone's track list plus a cursor into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSchedule {
    order: Vec<usize>,
    index: usize,
}

impl TrackSchedule {
    /// Identity order over `len` tracks.
    pub fn new(len: usize) -> Self {
        Self {
            order: (0..len).collect(),
            index: 0,
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Position of the next track to play.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        shuffle_in_place(&mut self.order, rng);
    }

    /// Track (list index) the cursor points at, reshuffling and rewinding
    /// first when the order is exhausted.
    pub fn next_track<R: Rng>(&mut self, shuffle: bool, rng: &mut R) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        if self.index >= self.order.len() {
            if shuffle {
                self.shuffle(rng);
            }
            self.index = 0;
        }
        Some(self.order[self.index])
    }

    /// Move the cursor past the track returned by [`TrackSchedule::next_track`].
    pub fn advance(&mut self) {
        self.index += 1;
    }
}

/// Swap each position with a uniformly chosen position at or after it.
pub fn shuffle_in_place<T, R: Rng>(items: &mut [T], rng: &mut R) {
    let len = items.len();
    if len < 2 {
        return;
    }
    for i in 0..len - 1 {
        let j = rng.gen_range(i..len);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn plays_every_track_once_per_cycle() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut schedule = TrackSchedule::new(4);
        let mut played = Vec::new();
        for _ in 0..4 {
            played.push(schedule.next_track(false, &mut rng).expect("track"));
            schedule.advance();
        }
        assert_eq!(played, vec![0, 1, 2, 3]);
        assert_eq!(schedule.next_track(false, &mut rng), Some(0));
        assert_eq!(schedule.index(), 0);
    }

    #[test]
    fn reshuffle_keeps_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut schedule = TrackSchedule::new(8);
        for _ in 0..5 {
            for _ in 0..8 {
                schedule.next_track(true, &mut rng);
                schedule.advance();
            }
            schedule.next_track(true, &mut rng);
            let mut sorted = schedule.order().to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn next_track_does_not_move_cursor() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut schedule = TrackSchedule::new(2);
        assert_eq!(schedule.next_track(false, &mut rng), Some(0));
        assert_eq!(schedule.next_track(false, &mut rng), Some(0));
        schedule.advance();
        assert_eq!(schedule.next_track(false, &mut rng), Some(1));
    }

    #[test]
    fn empty_schedule_has_no_tracks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut schedule = TrackSchedule::new(0);
        assert_eq!(schedule.next_track(true, &mut rng), None);
    }

    #[test]
    fn shuffle_is_uniform_enough() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut firsts = [0u32; 3];
        for _ in 0..3000 {
            let mut items = [0usize, 1, 2];
            shuffle_in_place(&mut items, &mut rng);
            firsts[items[0]] += 1;
        }
        for count in firsts {
            assert!((800..1200).contains(&count), "skewed: {:?}", firsts);
        }
    }
}

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::video::Video;

/// Fixed pool of generic items used to fill the feed when there is no
/// personalization signal.
pub struct FallbackPool {
    videos: Vec<Video>,
}

impl FallbackPool {
    #[must_use]
    pub fn new(videos: Vec<Video>) -> Self {
        Self { videos }
    }

    /// The built-in demo pool.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(vec![
            Video::new(
                "dQw4w9WgXcQ",
                "Rick Astley - Never Gonna Give You Up (Music Video)",
                "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
                "Official RickAstley",
                "1987-10-25T00:00:00Z",
            ),
            Video::new(
                "E7wJTI-1dvQ",
                "Britney Spears - ...Baby One More Time (Official Video)",
                "https://img.youtube.com/vi/E7wJTI-1dvQ/hqdefault.jpg",
                "Britney Spears",
                "1998-10-23T00:00:00Z",
            ),
            Video::new(
                "3JZ_D3ELwOQ",
                "Eminem - Without Me (Official Music Video)",
                "https://img.youtube.com/vi/3JZ_D3ELwOQ/hqdefault.jpg",
                "EminemMusic",
                "2009-06-16T00:00:00Z",
            ),
            Video::new(
                "ShZ978fBl6Y",
                "Amazing Parkour Flip #shorts",
                "https://img.youtube.com/vi/ShZ978fBl6Y/hqdefault.jpg",
                "ParkourWorld",
                "2023-09-12T00:00:00Z",
            ),
            Video::new(
                "ZcUf59Yk5ig",
                "Quick Cat Reaction #shorts",
                "https://img.youtube.com/vi/ZcUf59Yk5ig/hqdefault.jpg",
                "FunnyPets",
                "2022-01-15T00:00:00Z",
            ),
            Video::new(
                "kJQP7kiw5Fk",
                "Despacito",
                "https://img.youtube.com/vi/kJQP7kiw5Fk/hqdefault.jpg",
                "Luis Fonsi",
                "2017-01-12T00:00:00Z",
            ),
            Video::new(
                "9bZkp7q19f0",
                "PSY - GANGNAM STYLE",
                "https://img.youtube.com/vi/9bZkp7q19f0/hqdefault.jpg",
                "officialpsy",
                "2012-07-15T00:00:00Z",
            ),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Draws up to `count` distinct items, order shuffled each call.
    #[must_use]
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Video> {
        let mut shuffled = self.videos.clone();
        shuffled.shuffle(rng);
        shuffled.truncate(count);
        shuffled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sample_is_distinct_and_bounded() {
        let pool = FallbackPool::demo();
        let mut rng = StdRng::seed_from_u64(7);

        let sampled = pool.sample(4, &mut rng);
        assert_eq!(sampled.len(), 4);

        let mut ids: Vec<&str> = sampled.iter().map(|v| v.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn sample_beyond_pool_size_exhausts_pool() {
        let pool = FallbackPool::demo();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pool.sample(100, &mut rng).len(), pool.len());
    }

    #[test]
    fn seeded_sampling_is_deterministic() {
        let pool = FallbackPool::demo();

        let a = pool.sample(4, &mut StdRng::seed_from_u64(42));
        let b = pool.sample(4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}

//! Demo posters loaded into an empty store when seeding is enabled.

use crate::poster::NewPoster;
use crate::store::{PosterStore, StoreResult};

const DEMO_POSTER_URL: &str = "https://placehold.co/600x900.png";

/// Three sample posters for a fresh kiosk.
pub fn demo_posters() -> Vec<NewPoster> {
    vec![
        NewPoster {
            id: None,
            name: "The Last Guardian".to_string(),
            poster_url: DEMO_POSTER_URL.to_string(),
            logo_url: String::new(),
            description: "In a dystopian future where humanity teeters on the brink of \
                extinction, one warrior stands as the final hope against an alien invasion \
                that has consumed the galaxy."
                .to_string(),
            starring: "Maya Rodriguez, James Chen, Alexandra Park".to_string(),
            director: "Marcus Thompson".to_string(),
            runtime: "127 minutes".to_string(),
            genre: "Sci-Fi Action Thriller".to_string(),
            rating: "PG-13".to_string(),
            poster_ai_hint: "sci-fi warrior poster".to_string(),
        },
        NewPoster {
            id: None,
            name: "Cybernetic City".to_string(),
            poster_url: DEMO_POSTER_URL.to_string(),
            logo_url: String::new(),
            description: "In a neon-drenched metropolis of the future, a hard-boiled detective \
                with a cybernetic heart untangles a conspiracy that reaches the highest \
                echelons of a city that never sleeps."
                .to_string(),
            starring: "Keanu Reeves, Scarlett Johansson".to_string(),
            director: "Denis Villeneuve".to_string(),
            runtime: "148 minutes".to_string(),
            genre: "Cyberpunk Noir".to_string(),
            rating: "R".to_string(),
            poster_ai_hint: "cyberpunk poster".to_string(),
        },
        NewPoster {
            id: None,
            name: "The Last Dragon".to_string(),
            poster_url: DEMO_POSTER_URL.to_string(),
            logo_url: String::new(),
            description: "In a realm of magic and myth, a young warrior is destined to find \
                the last dragon's egg. She must protect it from dark forces who seek to \
                extinguish the last spark of draconic power."
                .to_string(),
            starring: "Zendaya, Tom Holland".to_string(),
            director: "Peter Jackson".to_string(),
            runtime: "165 minutes".to_string(),
            genre: "Fantasy Adventure".to_string(),
            rating: "PG-13".to_string(),
            poster_ai_hint: "fantasy poster".to_string(),
        },
    ]
}

/// Add the demo posters when the store holds no posters yet.
///
/// Returns how many were inserted.
pub async fn seed_if_empty(store: &dyn PosterStore) -> StoreResult<usize> {
    if !store.list_posters().await?.is_empty() {
        tracing::debug!("Store already has posters, skipping demo seed");
        return Ok(0);
    }
    let posters = demo_posters();
    let count = posters.len();
    for poster in posters {
        store.add_poster(poster).await?;
    }
    tracing::info!(count, "Seeded demo posters");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;
    use crate::memory_store::MemoryStore;

    #[test]
    fn demo_posters_are_valid() {
        let posters = demo_posters();
        assert_eq!(posters.len(), 3);
        for poster in &posters {
            assert!(poster.validate().is_ok(), "{}", poster.name);
        }
    }

    #[tokio::test]
    async fn seeding_only_fills_an_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 3);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);

        let names: Vec<_> = store
            .list_posters()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["The Last Guardian", "Cybernetic City", "The Last Dragon"]);
    }
}

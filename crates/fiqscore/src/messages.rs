//! Taunts shown on the start screen.

use rand::Rng;
use rand::seq::SliceRandom;

/// Challenge lines; one is picked at random per game.
pub const CHALLENGE_MESSAGES: [&str; 10] = [
    "Think you know ball? Prove it.",
    "Only real fans make it to the final. You in?",
    "Ready to flex your football IQ or just here for vibes?",
    "Legends answer. Casuals guess. Which one are you?",
    "Are you scared of the spotlight? The pitch is yours.",
    "Don't tap Start unless you're built different.",
    "If you fear the questions, the bench is over there.",
    "Quiz kicks off now. Miss one? You're subbed.",
    "World-class knowledge or weekend watcher? Let's see.",
    "Only Champions answer with confidence.",
];

/// Picks a challenge line.
pub fn random_challenge<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CHALLENGE_MESSAGES
        .choose(rng)
        .copied()
        .unwrap_or(CHALLENGE_MESSAGES[0])
}

use rand::Rng;
use rand::seq::SliceRandom;

use crate::pool::Question;

/// Options to present for `question`. The first pass shows only the correct
/// answer; later passes pair it with one random distractor in random order.
/// A question with no valid correct option yields no options.
pub fn build_options<R: Rng + ?Sized>(
    question: &Question,
    pass_number: u32,
    rng: &mut R,
) -> Vec<String> {
    let Some(correct) = question.correct_option().map(str::to_string) else {
        return Vec::new();
    };
    if pass_number <= 1 {
        return vec![correct];
    }

    let distractors = question.distractors();
    let Some(distractor) = distractors.choose(rng) else {
        return vec![correct];
    };

    let mut options = vec![correct, distractor.to_string()];
    options.shuffle(rng);
    options
}

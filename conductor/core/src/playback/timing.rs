//! Playback Pacing
//!
//! The delay after a line is the number of seconds named by a `sleep N`
//! directive on that line, or a short random "typing" delay otherwise.

use std::sync::OnceLock;
use std::time::Duration;

use rand::Rng;
use regex::Regex;

/// Delay between loading a script and revealing its first line
pub const INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Lower bound of the typing delay (inclusive)
pub const TYPING_DELAY_MIN: Duration = Duration::from_millis(20);

/// Upper bound of the typing delay (exclusive)
pub const TYPING_DELAY_MAX: Duration = Duration::from_millis(70);

fn sleep_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bsleep\s+(\d+(\.\d+)?)").expect("valid sleep pattern"))
}

/// Delay named by a `sleep` directive anywhere in the line
///
/// Amounts too large to represent are ignored.
#[must_use]
pub fn sleep_delay(line: &str) -> Option<Duration> {
    let secs: f64 = sleep_pattern().captures(line)?.get(1)?.as_str().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Uniform random delay in `[20ms, 70ms)`
pub fn typing_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    let min = u64::try_from(TYPING_DELAY_MIN.as_micros()).unwrap_or(u64::MAX);
    let max = u64::try_from(TYPING_DELAY_MAX.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(rng.gen_range(min..max))
}

/// Delay to wait after revealing `line`
pub fn line_delay<R: Rng + ?Sized>(line: &str, rng: &mut R) -> Duration {
    sleep_delay(line).unwrap_or_else(|| typing_delay(rng))
}

/// Delays for every line of a script, in order
pub fn schedule<R: Rng + ?Sized>(lines: &[String], rng: &mut R) -> Vec<Duration> {
    lines.iter().map(|line| line_delay(line, rng)).collect()
}

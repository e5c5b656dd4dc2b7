use jiff::SpanRelativeTo;
use relay_optimizer::solver::solver_params::Threads;

pub fn parse_duration(input: &str) -> Result<jiff::SignedDuration, String> {
    if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    if let Ok(seconds) = input.parse::<i64>() {
        return Ok(jiff::SignedDuration::from_secs(seconds.abs()));
    }

    Err(String::from("Invalid duration"))
}

/// `auto`, or a number of worker threads.
pub fn parse_threads(input: &str) -> Result<Threads, String> {
    if input.eq_ignore_ascii_case("auto") {
        return Ok(Threads::Auto);
    }

    match input.parse::<usize>() {
        Ok(0) => Err(String::from("At least one thread is required")),
        Ok(1) => Ok(Threads::Single),
        Ok(threads) => Ok(Threads::Multi(threads)),
        Err(_) => Err(format!("Invalid thread count '{input}'")),
    }
}

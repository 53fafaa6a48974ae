//! Stack-walking call site lookup for `caller_skip`.

use backtrace::{Backtrace, BacktraceFrame};

/// Symbol prefixes of the public logging entry points.
const FACADE_PREFIXES: [&str; 2] = ["tierlog::logger::Logger::", "tierlog::global::"];

/// Resolve the call site `skip` frames above the caller of the facade.
///
/// With `skip == 1` a plain wrapper function is skipped and its caller is
/// reported. Returns `None` when symbols are unavailable, for example in a
/// stripped binary.
pub(crate) fn resolve(skip: usize) -> Option<(String, u32)> {
    let backtrace = Backtrace::new();
    let symbols = flatten(backtrace.frames());

    // The innermost run of facade frames ends at the entry point the user called.
    let first = symbols.iter().position(|(name, _)| is_facade(name))?;
    let outside = symbols[first..]
        .iter()
        .position(|(name, _)| !is_facade(name))
        .map_or(symbols.len(), |n| first + n);
    symbols
        .into_iter()
        .skip(outside + skip)
        .find_map(|(_, location)| location)
}

fn is_facade(name: &str) -> bool {
    let name = name.trim_start_matches('<');
    FACADE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// One entry per symbol, innermost first; inlined calls count as frames.
fn flatten(frames: &[BacktraceFrame]) -> Vec<(String, Option<(String, u32)>)> {
    frames
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(|symbol| {
            let name = symbol
                .name()
                .map(|name| format!("{:#}", name))
                .unwrap_or_default();
            let location = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => Some((file.display().to_string(), line)),
                _ => None,
            };
            (name, location)
        })
        .collect()
}

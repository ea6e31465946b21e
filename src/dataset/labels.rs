use anyhow::{bail, Result};

/// Votes a label needs out of four raters.
const MIN_AGREEMENT: usize = 3;

/// Majority label of four judgments, or the empty label without enough
/// agreement. Ties go to the label seen first.
pub fn resolve_label(votes: [&str; 4]) -> &str {
    let mut best = ("", 0usize);
    for (i, &vote) in votes.iter().enumerate() {
        if votes[..i].contains(&vote) {
            continue;
        }
        let count = votes.iter().filter(|&&v| v == vote).count();
        if count > best.1 {
            best = (vote, count);
        }
    }
    if best.1 >= MIN_AGREEMENT {
        best.0
    } else {
        ""
    }
}

/// Map a raw causality label to the positive/negative example class.
pub fn causality(label: &str) -> Result<&'static str> {
    Ok(match label {
        "業績" | "" => "負例",
        "暗黙的な業績要因" | "明示的な業績要因" => "正例",
        other => bail!("unknown label {:?}", other),
    })
}

/// Collapse graded polarity marks to `+`, `-` or `?`.
pub fn polarity(mark: &str) -> Result<&'static str> {
    Ok(match mark {
        "++" | "+" => "+",
        "+-" => "?",
        "-" | "--" => "-",
        "" => "",
        other => bail!("unknown polarity {:?}", other),
    })
}

/// Index of the largest score; the lowest index wins ties.
///
/// NaN entries never win. Returns `None` for an empty slice or one holding
/// only NaNs.
pub(crate) fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_tie_prefers_lowest_index() {
        assert_eq!(argmax(&[1.0, 1.0, 0.5]), Some(0));
        assert_eq!(argmax(&[0.0, 2.0, 2.0]), Some(1));
    }

    #[test]
    fn test_argmax_negative_logits() {
        assert_eq!(argmax(&[-3.0, -1.5, -2.0]), Some(1));
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, -1.0, -2.0]), Some(1));
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(argmax(&[]), None);
    }
}

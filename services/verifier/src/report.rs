//! End-of-run console reporting.

use matcher::LandCorrections;

/// Print the stations whose nearest model cell disagreed with their true
/// land type, five ids per line. Silent when no station was corrected.
pub fn print_land_corrections(corrections: &LandCorrections) {
    if corrections.is_empty() {
        return;
    }
    println!(
        "The following station(s) model-adjacent location(s) are opposite of their true"
    );
    println!("land types (water/land). If single_point_analysis is false, then these are");
    println!("corrected and the average consists of only neighboring grid cells that");
    println!("share the same true land type.");
    println!();
    for chunk in corrections.stations().chunks(5) {
        println!("\t{}", chunk.join(", "));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_corrections_stay_silent() {
        // Only exercises the early return; output itself is not captured.
        print_land_corrections(&LandCorrections::new());
    }

    #[test]
    fn chunks_split_five_per_line() {
        let mut c = LandCorrections::new();
        for id in ["A", "B", "C", "D", "E", "F", "G"] {
            c.record(id);
        }
        let lines: Vec<String> = c
            .stations()
            .chunks(5)
            .map(|chunk| chunk.join(", "))
            .collect();
        assert_eq!(lines, vec!["A, B, C, D, E", "F, G"]);
    }
}

//! Catalog of coding problems handed out during interviews.

use rand::seq::SliceRandom;

const PROBLEM_BASE_URL: &str = "https://leetcode.com/problems/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    pub title: &'static str,
    pub slug: &'static str,
}

impl Problem {
    pub fn url(&self) -> String {
        format!("{PROBLEM_BASE_URL}{}/", self.slug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn problems(self) -> &'static [Problem] {
        match self {
            Difficulty::Easy => &[
                Problem {
                    title: "Two Sum",
                    slug: "two-sum",
                },
                Problem {
                    title: "Merge Two Sorted Lists",
                    slug: "merge-two-sorted-lists",
                },
            ],
            Difficulty::Medium => &[
                Problem {
                    title: "Longest Substring Without Repeating Characters",
                    slug: "longest-substring-without-repeating-characters",
                },
                Problem {
                    title: "3Sum",
                    slug: "3sum",
                },
            ],
            Difficulty::Hard => &[
                Problem {
                    title: "Median of Two Sorted Arrays",
                    slug: "median-of-two-sorted-arrays",
                },
                Problem {
                    title: "Trapping Rain Water",
                    slug: "trapping-rain-water",
                },
            ],
        }
    }
}

/// Picks a problem of the given difficulty at random.
pub fn pick(difficulty: Difficulty) -> Problem {
    let problems = difficulty.problems();
    *problems
        .choose(&mut rand::thread_rng())
        .unwrap_or(&problems[0])
}

/// Text returned to the model: what to ask, what to require, and where the problem lives.
pub fn describe(problem: &Problem) -> String {
    format!(
        "Please ask the candidate to solve {}. Requirement: Analyze Time Complexity. {}",
        problem.title,
        problem.url()
    )
}

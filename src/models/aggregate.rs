//! Read-only views derived from the loaded subjects.
//!
//! Every function recomputes from scratch over the snapshot it is given.
//! All orderings use stable sorts, so entries that compare equal keep
//! subject order, then topic order within the subject.

use super::{QuizAttempt, Subject, Topic};
use chrono::{DateTime, TimeZone};

/// A due topic together with the name of its subject.
#[derive(Debug, Clone, Copy)]
pub struct StudyPlanEntry<'a> {
    pub subject_name: &'a str,
    pub topic: &'a Topic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyProgress {
    pub completed: u32,
    pub goal: u32,
    pub percent: u32,
}

impl DailyProgress {
    pub fn goal_reached(&self) -> bool {
        self.completed >= self.goal
    }

    /// Topics still needed to reach the goal today.
    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStats {
    pub subjects: usize,
    pub total_attempts: usize,
    pub average_accuracy_percent: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryEntry<'a> {
    pub subject_name: &'a str,
    pub topic_name: &'a str,
    pub attempt: &'a QuizAttempt,
}

/// Colour band used when displaying an accuracy percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AccuracyTier {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            80.. => AccuracyTier::Excellent,
            60..=79 => AccuracyTier::Good,
            40..=59 => AccuracyTier::Fair,
            _ => AccuracyTier::Poor,
        }
    }
}

fn rounded_percent(numerator: f64, denominator: f64) -> u32 {
    (100.0 * numerator / denominator).round() as u32
}

/// Topics due for review across all subjects, oldest due date first.
pub fn study_plan<'a, Tz: TimeZone>(
    subjects: &'a [Subject],
    now: &DateTime<Tz>,
) -> Vec<StudyPlanEntry<'a>> {
    let mut plan: Vec<StudyPlanEntry<'a>> = subjects
        .iter()
        .flat_map(|subject| {
            subject.topics.iter().map(move |topic| StudyPlanEntry {
                subject_name: subject.name.as_str(),
                topic,
            })
        })
        .filter(|entry| entry.topic.is_due(now))
        .collect();

    plan.sort_by_key(|entry| entry.topic.next_review_date);
    plan
}

/// Counts distinct topics quizzed on the calendar day of `now`.
pub fn daily_progress<Tz: TimeZone>(
    subjects: &[Subject],
    now: &DateTime<Tz>,
    goal: u32,
) -> DailyProgress {
    let today = now.date_naive();
    let tz = now.timezone();

    let completed = subjects
        .iter()
        .flat_map(|subject| subject.topics.iter())
        .filter(|topic| {
            topic
                .quiz_history()
                .iter()
                .any(|attempt| attempt.date().with_timezone(&tz).date_naive() == today)
        })
        .count() as u32;

    // A goal of zero is met by definition.
    let percent = if goal == 0 {
        100
    } else {
        rounded_percent(f64::from(completed), f64::from(goal)).min(100)
    };

    DailyProgress {
        completed,
        goal,
        percent,
    }
}

/// Percentage of a subject's topics whose latest attempt reaches `threshold`.
/// Topics never quizzed count as not mastered; an empty subject yields 0.
pub fn subject_mastery(subject: &Subject, threshold: f64) -> u32 {
    let mastered = subject
        .topics
        .iter()
        .filter(|topic| topic.is_mastered(threshold))
        .count();
    let denominator = subject.topics.len().max(1);

    rounded_percent(mastered as f64, denominator as f64)
}

/// Attempt volume and mean accuracy over everything the user can see.
pub fn global_stats(subjects: &[Subject]) -> GlobalStats {
    let (total_attempts, ratio_sum) = subjects
        .iter()
        .flat_map(|subject| subject.topics.iter())
        .flat_map(|topic| topic.quiz_history().iter())
        .fold((0usize, 0.0f64), |(count, sum), attempt| {
            (count + 1, sum + attempt.ratio())
        });

    let average_accuracy_percent = if total_attempts == 0 {
        0
    } else {
        rounded_percent(ratio_sum, total_attempts as f64)
    };

    GlobalStats {
        subjects: subjects.len(),
        total_attempts,
        average_accuracy_percent,
    }
}

/// Every attempt with its subject and topic names, newest first.
pub fn attempt_history(subjects: &[Subject]) -> Vec<HistoryEntry<'_>> {
    let mut history: Vec<HistoryEntry<'_>> = subjects
        .iter()
        .flat_map(|subject| {
            subject.topics.iter().flat_map(move |topic| {
                topic.quiz_history().iter().map(move |attempt| HistoryEntry {
                    subject_name: subject.name.as_str(),
                    topic_name: topic.name.as_str(),
                    attempt,
                })
            })
        })
        .collect();

    history.sort_by(|a, b| b.attempt.date().cmp(&a.attempt.date()));
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    fn attempt_at(date: DateTime<Utc>, score: u32, total: u32) -> QuizAttempt {
        QuizAttempt::new(
            uuid::Uuid::new_v4().to_string(),
            date,
            score,
            total,
            vec![],
            vec![],
            false,
        )
        .unwrap()
    }

    fn topic_due_at(name: &str, due: Option<DateTime<Utc>>) -> Topic {
        let mut topic = Topic::new(name, "");
        topic.next_review_date = due;
        topic
    }

    fn subject_with(name: &str, topics: Vec<Topic>) -> Subject {
        let mut subject = Subject::new("user-1", name, "book");
        subject.topics = topics;
        subject
    }

    #[test]
    fn test_study_plan_filters_and_sorts() {
        let now = now();
        let subjects = vec![
            subject_with(
                "Biology",
                vec![
                    topic_due_at("Cells", Some(now - Duration::days(1))),
                    topic_due_at("Never attempted", None),
                    topic_due_at("Future", Some(now + Duration::days(1))),
                ],
            ),
            subject_with(
                "History",
                vec![
                    topic_due_at("Rome", Some(now - Duration::days(3))),
                    topic_due_at("Exactly now", Some(now)),
                ],
            ),
        ];

        let plan = study_plan(&subjects, &now);
        let names: Vec<&str> = plan.iter().map(|e| e.topic.name.as_str()).collect();
        assert_eq!(names, vec!["Rome", "Cells", "Exactly now"]);
        assert_eq!(plan[0].subject_name, "History");
    }

    #[test]
    fn test_study_plan_ties_keep_iteration_order() {
        let due = now() - Duration::hours(2);
        let subjects = vec![
            subject_with("B", vec![topic_due_at("b1", Some(due)), topic_due_at("b2", Some(due))]),
            subject_with("A", vec![topic_due_at("a1", Some(due))]),
        ];

        let plan = study_plan(&subjects, &now());
        let names: Vec<&str> = plan.iter().map(|e| e.topic.name.as_str()).collect();
        assert_eq!(names, vec!["b1", "b2", "a1"]);
    }

    #[test]
    fn test_daily_progress_counts_distinct_topics() {
        let now = now();
        let mut topics = Vec::new();
        for name in ["One", "Two", "Three"] {
            let mut topic = Topic::new(name, "");
            topic.record_attempt(attempt_at(now - Duration::hours(1), 5, 10));
            topics.push(topic);
        }
        // second review of the same topic today
        topics[0].record_attempt(attempt_at(now - Duration::minutes(5), 9, 10));

        let mut yesterday_only = Topic::new("Four", "");
        yesterday_only.record_attempt(attempt_at(now - Duration::days(1), 9, 10));
        topics.push(yesterday_only);

        let subjects = vec![subject_with("Biology", topics)];
        let progress = daily_progress(&subjects, &now, 3);

        assert_eq!(progress.completed, 3);
        assert_eq!(progress.percent, 100);
        assert!(progress.goal_reached());
        assert_eq!(progress.remaining(), 0);
    }

    #[test]
    fn test_daily_progress_partial_and_capped() {
        let now = now();
        let mut topic = Topic::new("One", "");
        topic.record_attempt(attempt_at(now, 5, 10));
        let subjects = vec![subject_with("Biology", vec![topic])];

        let progress = daily_progress(&subjects, &now, 3);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.percent, 33);
        assert_eq!(progress.remaining(), 2);

        let over = daily_progress(&subjects, &now, 1);
        assert_eq!(over.percent, 100);

        let no_goal = daily_progress(&subjects, &now, 0);
        assert_eq!(no_goal.percent, 100);
    }

    #[test]
    fn test_daily_progress_uses_calendar_day_of_now() {
        // 23:30 on Jan 9 in UTC-5 is 04:30 on Jan 10 UTC
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let attempt_time = Utc.with_ymd_and_hms(2024, 1, 10, 4, 30, 0).unwrap();
        let mut topic = Topic::new("One", "");
        topic.record_attempt(attempt_at(attempt_time, 5, 10));
        let subjects = vec![subject_with("Biology", vec![topic])];

        let utc_now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(daily_progress(&subjects, &utc_now, 3).completed, 1);

        let local_now = utc_now.with_timezone(&offset);
        assert_eq!(daily_progress(&subjects, &local_now, 3).completed, 0);
    }

    #[test]
    fn test_subject_mastery_half() {
        let mut mastered = Topic::new("Mastered", "");
        mastered.record_attempt(attempt_at(now(), 9, 10));
        let mut struggling = Topic::new("Struggling", "");
        struggling.record_attempt(attempt_at(now(), 4, 10));

        let subject = subject_with("Biology", vec![mastered, struggling]);
        assert_eq!(subject_mastery(&subject, 0.90), 50);
    }

    #[test]
    fn test_subject_mastery_uses_latest_attempt() {
        let mut topic = Topic::new("Cells", "");
        topic.record_attempt(attempt_at(now() - Duration::days(2), 10, 10));
        topic.record_attempt(attempt_at(now(), 2, 10));

        let subject = subject_with("Biology", vec![topic]);
        assert_eq!(subject_mastery(&subject, 0.90), 0);
    }

    #[test]
    fn test_subject_mastery_empty_subject() {
        let subject = subject_with("Empty", vec![]);
        assert_eq!(subject_mastery(&subject, 0.90), 0);
    }

    #[test]
    fn test_subject_mastery_counts_unattempted_topics_as_unmastered() {
        let mut mastered = Topic::new("Mastered", "");
        mastered.record_attempt(attempt_at(now(), 10, 10));
        let subject = subject_with(
            "Biology",
            vec![mastered, Topic::new("New", ""), Topic::new("Newer", "")],
        );
        assert_eq!(subject_mastery(&subject, 0.90), 33);
    }

    #[test]
    fn test_global_stats_empty() {
        let stats = global_stats(&[]);
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.average_accuracy_percent, 0);

        let stats = global_stats(&[subject_with("Biology", vec![Topic::new("Cells", "")])]);
        assert_eq!(
            stats,
            GlobalStats {
                subjects: 1,
                total_attempts: 0,
                average_accuracy_percent: 0
            }
        );
    }

    #[test]
    fn test_global_stats_mean_of_ratios() {
        let mut first = Topic::new("Cells", "");
        first.record_attempt(attempt_at(now(), 1, 2));
        first.record_attempt(attempt_at(now(), 10, 10));
        let mut second = Topic::new("Rome", "");
        second.record_attempt(attempt_at(now(), 1, 4));

        let subjects = vec![
            subject_with("Biology", vec![first]),
            subject_with("History", vec![second]),
        ];
        let stats = global_stats(&subjects);

        assert_eq!(stats.subjects, 2);
        assert_eq!(stats.total_attempts, 3);
        // (0.5 + 1.0 + 0.25) / 3 = 0.5833
        assert_eq!(stats.average_accuracy_percent, 58);
    }

    #[test]
    fn test_attempt_history_newest_first() {
        let mut cells = Topic::new("Cells", "");
        cells.record_attempt(attempt_at(now() - Duration::days(3), 5, 10));
        let mut rome = Topic::new("Rome", "");
        rome.record_attempt(attempt_at(now() - Duration::days(5), 6, 10));
        rome.record_attempt(attempt_at(now(), 7, 10));

        let subjects = vec![
            subject_with("Biology", vec![cells]),
            subject_with("History", vec![rome]),
        ];
        let history = attempt_history(&subjects);

        let scores: Vec<u32> = history.iter().map(|e| e.attempt.score()).collect();
        assert_eq!(scores, vec![7, 5, 6]);
        assert_eq!(history[1].subject_name, "Biology");
        assert_eq!(history[1].topic_name, "Cells");
    }

    #[test]
    fn test_accuracy_tiers() {
        assert_eq!(AccuracyTier::from_percent(100), AccuracyTier::Excellent);
        assert_eq!(AccuracyTier::from_percent(80), AccuracyTier::Excellent);
        assert_eq!(AccuracyTier::from_percent(79), AccuracyTier::Good);
        assert_eq!(AccuracyTier::from_percent(40), AccuracyTier::Fair);
        assert_eq!(AccuracyTier::from_percent(39), AccuracyTier::Poor);
    }
}

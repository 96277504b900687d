use crate::models::domain::{Category, CategoryGroup, Question, Quiz, QuizPart, Topic, User};

pub mod fixtures {
    use super::*;

    /// Player with an `@example.com` address.
    pub fn test_user(username: &str) -> User {
        User::new(
            "Test",
            "User",
            username,
            &format!("{}@example.com", username),
        )
    }

    pub fn staff_user(username: &str) -> User {
        test_user(username).staff()
    }

    pub fn named_user(first_name: &str, last_name: &str) -> User {
        let username = format!("{}{}", first_name, last_name).to_lowercase();
        User::new(
            first_name,
            last_name,
            &username,
            &format!("{}@example.com", username),
        )
    }

    /// A quiz with one part holding the given topics.
    pub fn quiz_with_topics(
        season: i32,
        week: &str,
        titles: &[&str],
    ) -> (Quiz, QuizPart, Vec<Topic>) {
        let quiz = Quiz::new(season, week);
        let part = QuizPart::new(&quiz.id, 1);
        let topics = titles.iter().map(|title| Topic::new(&part.id, title)).collect();
        (quiz, part, topics)
    }

    pub fn categorized_question(topic: &Topic, categories: &[&Category]) -> Question {
        let mut question = Question::new(
            &topic.id,
            &format!("Question about {}?", topic.title),
            "Answer",
            topic.is_box(),
        );
        question.add_categories(categories.iter().map(|c| c.id.clone()));
        question
    }

    pub fn category_in_new_group(group_name: &str, name: &str) -> (CategoryGroup, Category) {
        let group = CategoryGroup::new(group_name);
        let category = Category::new(name, &group.id);
        (group, category)
    }
}

pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_user_fixture() {
        let user = test_user("custom");
        assert_eq!(user.username, "custom");
        assert_eq!(user.email, "custom@example.com");
        assert!(!user.is_staff);
        assert!(staff_user("admin").is_staff);
    }

    #[test]
    fn named_user_has_full_name() {
        let user = named_user("Ana", "Silva");
        assert_eq!(user.full_name(), "Ana Silva");
        assert_eq!(user.username, "anasilva");
    }

    #[test]
    fn quiz_fixture_links_topics_to_part() {
        let (quiz, part, topics) = quiz_with_topics(3, "4", &["Cinema", "Mystery Box 1"]);
        assert_eq!(part.quiz_id, quiz.id);
        assert!(topics.iter().all(|t| t.quiz_part_id == part.id));

        let (_, history) = category_in_new_group("Culture", "History");
        let question = categorized_question(&topics[1], &[&history]);
        assert!(question.is_box);
        assert_eq!(question.category_ids, vec![history.id.clone()]);
    }
}

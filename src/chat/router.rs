/// Options of the numbered chat menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    TodaySchedule,
    UpcomingEvents,
    Appointment,
    NextMeetingLocation,
    ContactOffice,
}

impl MenuOption {
    /// Match an exact menu code ("1" to "5")
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::TodaySchedule),
            "2" => Some(Self::UpcomingEvents),
            "3" => Some(Self::Appointment),
            "4" => Some(Self::NextMeetingLocation),
            "5" => Some(Self::ContactOffice),
            _ => None,
        }
    }

    /// The natural-language request the option stands for
    pub fn intent_text(self) -> &'static str {
        match self {
            Self::TodaySchedule => "Show me today's schedule.",
            Self::UpcomingEvents => "Show me upcoming events for the next 7 days.",
            Self::Appointment => "Appointment option selected.",
            Self::NextMeetingLocation => "Tell me the location of the next public meeting.",
            Self::ContactOffice => "Contact office team.",
        }
    }
}

/// Map a chat message to the intent text handed to the model.
///
/// Menu codes become their canonical request; anything else passes through
/// trimmed but otherwise untouched.
pub fn route_message(message: &str) -> String {
    let trimmed = message.trim();
    match MenuOption::from_code(trimmed) {
        Some(option) => option.intent_text().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_codes() {
        assert_eq!(route_message("1"), "Show me today's schedule.");
        assert_eq!(route_message("2"), "Show me upcoming events for the next 7 days.");
        assert_eq!(route_message("3"), "Appointment option selected.");
        assert_eq!(route_message("4"), "Tell me the location of the next public meeting.");
        assert_eq!(route_message("5"), "Contact office team.");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(route_message(" 1 "), "Show me today's schedule.");
        assert_eq!(route_message("\t5\n"), "Contact office team.");
    }

    #[test]
    fn test_pass_through() {
        assert_eq!(route_message("hello"), "hello");
        assert_eq!(route_message("6"), "6");
        assert_eq!(route_message("11"), "11");
        assert_eq!(route_message("1."), "1.");
        assert_eq!(route_message("Srikakulam meeting time today"), "Srikakulam meeting time today");
        assert_eq!(route_message(""), "");
    }
}

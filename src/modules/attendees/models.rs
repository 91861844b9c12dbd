use passin_db::models::AttendeeBadge;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BadgeEvent {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct BadgeAttendee {
    pub email: String,
    pub name: String,
    pub event: BadgeEvent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub attendee: BadgeAttendee,
    pub check_in_url: String,
}

#[derive(Debug, Serialize)]
pub struct BadgeResponse {
    pub badge: Badge,
}

impl BadgeResponse {
    pub fn new(badge: AttendeeBadge, check_in_url: String) -> Self {
        BadgeResponse {
            badge: Badge {
                attendee: BadgeAttendee {
                    email: badge.email,
                    name: badge.name,
                    event: BadgeEvent {
                        title: badge.event_title,
                        slug: badge.event_slug,
                    },
                },
                check_in_url,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_serializes_nested_shape() {
        let badge = AttendeeBadge {
            id: 7,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            event_title: "Unite Summit".to_string(),
            event_slug: "unite-summit".to_string(),
        };
        let json = serde_json::to_value(BadgeResponse::new(
            badge,
            "http://localhost:3333/attendees/7/check-in".to_string(),
        ))
        .unwrap();

        assert_eq!(json["badge"]["attendee"]["event"]["slug"], "unite-summit");
        assert_eq!(json["badge"]["attendee"]["email"], "ana@example.com");
        assert_eq!(
            json["badge"]["checkInUrl"],
            "http://localhost:3333/attendees/7/check-in"
        );
    }
}

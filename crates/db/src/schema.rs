//! Table definitions applied by the module migrations. Constraint names
//! match the ones in [`crate::error`].

pub const CREATE_EVENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        details TEXT,
        slug TEXT NOT NULL,
        maximum_attendees INTEGER
            CHECK (maximum_attendees IS NULL OR maximum_attendees > 0),
        CONSTRAINT uq_events_slug UNIQUE (slug)
    );
"#;

pub const CREATE_ATTENDEES: &str = r#"
    CREATE TABLE IF NOT EXISTS attendees (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        event_id UUID NOT NULL REFERENCES events (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT uq_attendees_event_email UNIQUE (event_id, email)
    );
    CREATE INDEX IF NOT EXISTS ix_attendees_event_created
        ON attendees (event_id, created_at DESC, id DESC);
"#;

pub const CREATE_CHECK_INS: &str = r#"
    CREATE TABLE IF NOT EXISTS check_ins (
        id SERIAL PRIMARY KEY,
        attendee_id INTEGER NOT NULL REFERENCES attendees (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT uq_check_ins_attendee UNIQUE (attendee_id)
    );
"#;

//! SQL schema for the case-brief SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Tables in foreign-key dependency order. Dumps write rows in this order so
/// a restore never inserts a child before its parent.
pub const TABLE_ORDER: &[&str] =
  &["Courses", "Subjects", "Opinions", "Cases", "CaseSubjects", "CaseOpinions"];

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// The aggregate views use `group_concat(... ORDER BY ...)`, which needs
/// SQLite 3.44 or newer (the bundled library satisfies this).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS Courses (
    name TEXT PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS Subjects (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS Opinions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    author       TEXT NOT NULL,
    opinion_text TEXT NOT NULL
);

-- title is derived; it cannot be inserted or updated.
CREATE TABLE IF NOT EXISTS Cases (
    label     TEXT PRIMARY KEY NOT NULL,
    plaintiff TEXT NOT NULL,
    defendant TEXT NOT NULL,
    title     TEXT GENERATED ALWAYS AS (plaintiff || ' v. ' || defendant) VIRTUAL,
    citation  TEXT NOT NULL DEFAULT '',
    course    TEXT REFERENCES Courses(name) ON UPDATE CASCADE ON DELETE RESTRICT,
    facts     TEXT NOT NULL DEFAULT '',
    procedure TEXT NOT NULL DEFAULT '',
    issue     TEXT NOT NULL DEFAULT '',
    holding   TEXT NOT NULL DEFAULT '',
    principle TEXT NOT NULL DEFAULT '',
    reasoning TEXT NOT NULL DEFAULT '',
    notes     TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS CaseSubjects (
    case_label TEXT    NOT NULL REFERENCES Cases(label)
                       ON UPDATE CASCADE ON DELETE CASCADE,
    subject_id INTEGER NOT NULL REFERENCES Subjects(id) ON DELETE RESTRICT,
    PRIMARY KEY (case_label, subject_id)
);

CREATE TABLE IF NOT EXISTS CaseOpinions (
    case_label TEXT    NOT NULL REFERENCES Cases(label)
                       ON UPDATE CASCADE ON DELETE CASCADE,
    opinion_id INTEGER NOT NULL REFERENCES Opinions(id) ON DELETE RESTRICT,
    PRIMARY KEY (case_label, opinion_id)
);

CREATE INDEX IF NOT EXISTS cases_course_idx         ON Cases(course);
CREATE INDEX IF NOT EXISTS case_subjects_subject_idx ON CaseSubjects(subject_id);
CREATE INDEX IF NOT EXISTS case_opinions_opinion_idx ON CaseOpinions(opinion_id);

-- Guard triggers: a referenced subject or opinion cannot be deleted.
CREATE TRIGGER IF NOT EXISTS subjects_guard_delete
BEFORE DELETE ON Subjects
WHEN EXISTS (SELECT 1 FROM CaseSubjects WHERE subject_id = OLD.id)
BEGIN
    SELECT RAISE(ABORT, 'subject is referenced by a case');
END;

CREATE TRIGGER IF NOT EXISTS opinions_guard_delete
BEFORE DELETE ON Opinions
WHEN EXISTS (SELECT 1 FROM CaseOpinions WHERE opinion_id = OLD.id)
BEGIN
    SELECT RAISE(ABORT, 'opinion is referenced by a case');
END;

CREATE VIEW IF NOT EXISTS CaseSubjectsView AS
SELECT cs.case_label AS case_label,
       s.id          AS subject_id,
       s.name        AS subject_name
FROM CaseSubjects cs
JOIN Subjects s ON s.id = cs.subject_id;

CREATE VIEW IF NOT EXISTS CaseOpinionsView AS
SELECT co.case_label   AS case_label,
       o.id            AS opinion_id,
       o.author        AS opinion_author,
       o.opinion_text  AS opinion_text
FROM CaseOpinions co
JOIN Opinions o ON o.id = co.opinion_id;

CREATE VIEW IF NOT EXISTS CaseDetailsView AS
SELECT c.label, c.plaintiff, c.defendant, c.title, c.citation, c.course,
       c.facts, c.procedure, c.issue, c.holding, c.principle, c.reasoning,
       c.notes,
       COALESCE(subj.subjects, '') AS subjects,
       COALESCE(ops.opinions, '')  AS opinions
FROM Cases c
LEFT JOIN (
    SELECT case_label,
           group_concat(subject_name, ', ' ORDER BY subject_name) AS subjects
    FROM (SELECT DISTINCT case_label, subject_name FROM CaseSubjectsView)
    GROUP BY case_label
) subj ON subj.case_label = c.label
LEFT JOIN (
    SELECT case_label,
           group_concat(opinion_author || ': ' || opinion_text, char(10)
                        ORDER BY opinion_author, opinion_text) AS opinions
    FROM (SELECT DISTINCT case_label, opinion_author, opinion_text
          FROM CaseOpinionsView)
    GROUP BY case_label
) ops ON ops.case_label = c.label;

PRAGMA user_version = 1;
";

//! Default rows inserted on first run, also used as the local cache seed.

use chrono::{DateTime, NaiveDate, Utc};

use super::family_member::{FamilyMember, MemberId, NewFamilyMember};
use super::todo::{Priority, Todo, TodoId};

// 2025-10-16T00:00:00Z
const SEED_EPOCH_SECS: i64 = 1_760_572_800;

fn seed_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(SEED_EPOCH_SECS, 0).unwrap_or_default()
}

const MEMBERS: [(&str, &str, &str); 4] = [
    ("dad", "Dad", "#3b82f6"),
    ("mom", "Mom", "#ec4899"),
    ("son", "Son", "#10b981"),
    ("daughter", "Daughter", "#f59e0b"),
];

// (id, title, completed, assignee index, due date, priority)
const TODOS: [(&str, &str, bool, usize, Option<(i32, u32, u32)>, Priority); 5] = [
    ("1", "Buy groceries for dinner", false, 1, Some((2025, 10, 16)), Priority::High),
    ("2", "Finish homework", false, 2, Some((2025, 10, 17)), Priority::Normal),
    ("3", "Take out the trash", true, 0, Some((2025, 10, 16)), Priority::Normal),
    ("4", "Piano practice", false, 3, None, Priority::Normal),
    ("5", "Fold the laundry", false, 1, Some((2025, 10, 16)), Priority::Normal),
];

pub fn new_family_members() -> Vec<NewFamilyMember> {
    MEMBERS
        .iter()
        .map(|(id, name, color)| NewFamilyMember { id: id.to_string(), name: name.to_string(), color: color.to_string() })
        .collect()
}

pub fn family_members() -> Vec<FamilyMember> {
    let created_at = seed_timestamp();
    new_family_members()
        .into_iter()
        .map(|m| FamilyMember { id: MemberId(m.id), name: m.name, color: m.color, created_at })
        .collect()
}

/// In display order.
pub fn todos() -> Vec<Todo> {
    let now = seed_timestamp();
    TODOS
        .iter()
        .map(|&(id, title, completed, member, due, priority)| {
            let (_, name, color) = MEMBERS[member];
            Todo {
                id: TodoId::from(id),
                title: title.to_string(),
                completed,
                assigned_to: name.to_string(),
                assigned_to_color: color.to_string(),
                due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                priority,
                category: None,
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

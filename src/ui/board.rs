use chrono::NaiveDate;

use crate::cache::LocalCache;
use crate::client::{ClientError, FamilyTodoApi};
use crate::domain::family_member::FamilyMember;
use crate::domain::seed;
use crate::domain::todo::{NewTodo, Todo, TodoId, TodoPatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn next(self) -> Self {
        match self { Self::All => Self::Active, Self::Active => Self::Completed, Self::Completed => Self::All }
    }

    pub fn label(self) -> &'static str {
        match self { Self::All => "All", Self::Active => "Active", Self::Completed => "Completed" }
    }

    fn admits(self, todo: &Todo) -> bool {
        match self { Self::All => true, Self::Active => !todo.completed, Self::Completed => todo.completed }
    }
}

/// Quick due-date pick offered when adding a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueChoice {
    #[default]
    None,
    Today,
    Tomorrow,
}

impl DueChoice {
    pub fn next(self) -> Self {
        match self { Self::None => Self::Today, Self::Today => Self::Tomorrow, Self::Tomorrow => Self::None }
    }

    pub fn label(self) -> &'static str {
        match self { Self::None => "no due date", Self::Today => "today", Self::Tomorrow => "tomorrow" }
    }

    pub fn date(self, today: NaiveDate) -> Option<NaiveDate> {
        match self { Self::None => None, Self::Today => Some(today), Self::Tomorrow => today.succ_opt() }
    }
}

/// Filters on the denormalized assignee name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MemberFilter {
    #[default]
    All,
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel { Success, Info, Error }

/// Transient message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, detail: impl Into<String>) -> Self {
        Self { level, title: title.to_string(), detail: Some(detail.into()) }
    }

    fn failed(title: &str, err: &ClientError) -> Self { Self::new(NoticeLevel::Error, title, err.message()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source { Api, Cache }

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Groups<'a> {
    pub overdue: Vec<&'a Todo>,
    pub today: Vec<&'a Todo>,
    pub tomorrow: Vec<&'a Todo>,
    pub upcoming: Vec<&'a Todo>,
    pub no_due_date: Vec<&'a Todo>,
    pub completed: Vec<&'a Todo>,
}

impl<'a> Groups<'a> {
    /// Non-empty sections in display order.
    pub fn sections(&self) -> Vec<(&'static str, &[&'a Todo])> {
        [
            ("Overdue", &self.overdue),
            ("Today", &self.today),
            ("Tomorrow", &self.tomorrow),
            ("Upcoming", &self.upcoming),
            ("No due date", &self.no_due_date),
            ("Completed", &self.completed),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(title, items)| (title, items.as_slice()))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub due_today: usize,
}

/// Client-side state of the todo board.
pub struct Board<A: FamilyTodoApi> {
    api: A,
    cache: LocalCache,
    pub todos: Vec<Todo>,
    pub members: Vec<FamilyMember>,
    pub status: StatusFilter,
    pub member: MemberFilter,
    pub source: Source,
}

impl<A: FamilyTodoApi> Board<A> {
    /// Fetches todos and members concurrently; if either request fails the
    /// todos come from the local cache and the members from the defaults.
    pub async fn load(api: A, cache: LocalCache) -> (Self, Option<Notice>) {
        let (todos, members) = tokio::join!(api.list_todos(), api.list_family_members());
        let mut board = Self {
            api,
            cache,
            todos: Vec::new(),
            members: Vec::new(),
            status: StatusFilter::default(),
            member: MemberFilter::default(),
            source: Source::Api,
        };
        match (todos, members) {
            (Ok(todos), Ok(members)) => {
                board.todos = todos.todos;
                board.members = members.family_members;
                board.mirror();
                (board, None)
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "failed to load from api, falling back to local cache");
                board.todos = board.cache.load();
                board.members = seed::family_members();
                board.source = Source::Cache;
                (board, Some(Notice::failed("Could not reach the server, showing saved tasks", &err)))
            }
        }
    }

    pub async fn add(&mut self, input: NewTodo) -> Notice {
        let title = input.title.clone();
        match self.api.create_todo(&input).await {
            Ok(created) => {
                self.todos.insert(0, created.todo);
                self.mirror();
                Notice::new(NoticeLevel::Success, "Task added", title)
            }
            Err(err) => Notice::failed("Failed to add task", &err),
        }
    }

    /// `None` when the id is unknown or nothing worth announcing happened.
    pub async fn toggle_completed(&mut self, id: &TodoId) -> Option<Notice> {
        let todo = self.find(id)?;
        let completing = !todo.completed;
        let title = todo.title.clone();
        match self.api.update_todo(id, &TodoPatch::completed(completing)).await {
            Ok(updated) => {
                self.replace(updated.todo);
                completing.then(|| Notice::new(NoticeLevel::Success, "Task completed!", title))
            }
            Err(err) => Some(Notice::failed("Failed to update task", &err)),
        }
    }

    pub async fn toggle_priority(&mut self, id: &TodoId) -> Option<Notice> {
        let next = self.find(id)?.priority.toggled();
        match self.api.update_todo(id, &TodoPatch::priority(next)).await {
            Ok(updated) => {
                self.replace(updated.todo);
                None
            }
            Err(err) => Some(Notice::failed("Failed to update priority", &err)),
        }
    }

    pub async fn remove(&mut self, id: &TodoId) -> Option<Notice> {
        let title = self.find(id)?.title.clone();
        match self.api.delete_todo(id).await {
            Ok(_) => {
                self.todos.retain(|t| &t.id != id);
                self.mirror();
                Some(Notice::new(NoticeLevel::Info, "Task deleted", title))
            }
            Err(err) => Some(Notice::failed("Failed to delete task", &err)),
        }
    }

    pub fn find(&self, id: &TodoId) -> Option<&Todo> { self.todos.iter().find(|t| &t.id == id) }

    /// Todos passing both filters, in list order.
    pub fn visible(&self) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|t| self.status.admits(t))
            .filter(|t| match &self.member { MemberFilter::All => true, MemberFilter::Named(name) => &t.assigned_to == name })
            .collect()
    }

    pub fn groups(&self, today: NaiveDate) -> Groups<'_> { group_by_due(self.visible(), today) }

    pub fn progress(&self, today: NaiveDate) -> Progress {
        Progress {
            total: self.todos.len(),
            completed: self.todos.iter().filter(|t| t.completed).count(),
            due_today: self.todos.iter().filter(|t| t.due_date == Some(today)).count(),
        }
    }

    pub fn pending_count_for(&self, name: &str) -> usize {
        self.todos.iter().filter(|t| !t.completed && t.assigned_to == name).count()
    }

    /// Cycles All → each member → All.
    pub fn cycle_member(&mut self) {
        let names: Vec<&str> = self.members.iter().map(|m| m.name.as_str()).collect();
        self.member = match &self.member {
            MemberFilter::All => names.first().map(|n| MemberFilter::Named(n.to_string())).unwrap_or(MemberFilter::All),
            MemberFilter::Named(current) => match names.iter().position(|n| n == current) {
                Some(i) if i + 1 < names.len() => MemberFilter::Named(names[i + 1].to_string()),
                _ => MemberFilter::All,
            },
        };
    }

    fn replace(&mut self, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) { *slot = todo; }
        self.mirror();
    }

    fn mirror(&self) {
        // Failures are already logged by the cache.
        let _ = self.cache.save(&self.todos);
    }
}

/// Completed todos go to their own group regardless of due date.
pub fn group_by_due(todos: Vec<&Todo>, today: NaiveDate) -> Groups<'_> {
    let tomorrow = today.succ_opt();
    let mut groups = Groups::default();
    for todo in todos {
        let slot = match todo.due_date {
            _ if todo.completed => &mut groups.completed,
            None => &mut groups.no_due_date,
            Some(d) if d < today => &mut groups.overdue,
            Some(d) if d == today => &mut groups.today,
            Some(d) if Some(d) == tomorrow => &mut groups.tomorrow,
            Some(_) => &mut groups.upcoming,
        };
        slot.push(todo);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientResult;
    use crate::domain::family_member::{FamilyMemberPatch, MemberId, NewFamilyMember};
    use crate::http::types::{
        DeleteFamilyMemberResponse, DeleteTodoResponse, FamilyMemberResponse, FamilyMembersResponse, TodoResponse, TodosResponse,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedApi {
        todos: Mutex<Vec<Todo>>,
        offline: bool,
    }

    fn offline() -> ClientError {
        ClientError::Api { status: StatusCode::SERVICE_UNAVAILABLE, message: "offline".into(), details: None }
    }

    #[async_trait]
    impl FamilyTodoApi for ScriptedApi {
        async fn list_todos(&self) -> ClientResult<TodosResponse> {
            if self.offline { return Err(offline()) }
            Ok(TodosResponse { todos: self.todos.lock().unwrap().clone() })
        }
        async fn create_todo(&self, input: &NewTodo) -> ClientResult<TodoResponse> {
            if self.offline { return Err(offline()) }
            let now = Utc::now();
            let todo = Todo {
                id: TodoId::from_millis(now.timestamp_millis()),
                title: input.title.clone(),
                completed: false,
                assigned_to: input.assigned_to.clone(),
                assigned_to_color: input.assigned_to_color.clone(),
                due_date: input.due_date,
                priority: input.priority,
                category: input.category.clone(),
                created_at: now,
                updated_at: now,
            };
            self.todos.lock().unwrap().insert(0, todo.clone());
            Ok(TodoResponse { todo })
        }
        async fn update_todo(&self, id: &TodoId, patch: &TodoPatch) -> ClientResult<TodoResponse> {
            if self.offline { return Err(offline()) }
            let mut todos = self.todos.lock().unwrap();
            let todo = todos.iter_mut().find(|t| &t.id == id).ok_or_else(offline)?;
            patch.apply_to(todo);
            Ok(TodoResponse { todo: todo.clone() })
        }
        async fn delete_todo(&self, id: &TodoId) -> ClientResult<DeleteTodoResponse> {
            if self.offline { return Err(offline()) }
            self.todos.lock().unwrap().retain(|t| &t.id != id);
            Ok(DeleteTodoResponse { success: true })
        }
        async fn list_family_members(&self) -> ClientResult<FamilyMembersResponse> {
            if self.offline { return Err(offline()) }
            Ok(FamilyMembersResponse { family_members: seed::family_members() })
        }
        async fn create_family_member(&self, _: &NewFamilyMember) -> ClientResult<FamilyMemberResponse> { Err(offline()) }
        async fn update_family_member(&self, _: &MemberId, _: &FamilyMemberPatch) -> ClientResult<FamilyMemberResponse> { Err(offline()) }
        async fn delete_family_member(&self, _: &MemberId) -> ClientResult<DeleteFamilyMemberResponse> { Err(offline()) }
    }

    fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2025, 10, d).unwrap() }

    #[tokio::test]
    async fn load_falls_back_to_cache_when_offline() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path().join("todos.json"));
        let mut saved = seed::todos();
        saved.truncate(2);
        assert!(cache.save(&saved).is_written());

        let api = ScriptedApi { offline: true, ..ScriptedApi::default() };
        let (board, notice) = Board::load(api, cache).await;
        assert_eq!(board.source, Source::Cache);
        assert_eq!(board.todos, saved);
        assert_eq!(board.members, seed::family_members());
        assert_eq!(notice.unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn successful_load_is_mirrored_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let api = ScriptedApi { todos: Mutex::new(seed::todos()[..1].to_vec()), offline: false };
        let (board, notice) = Board::load(api, LocalCache::new(&path)).await;
        assert!(notice.is_none());
        assert_eq!(board.source, Source::Api);
        assert_eq!(LocalCache::new(&path).load(), board.todos);
    }

    #[tokio::test]
    async fn actions_update_state_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let api = ScriptedApi { todos: Mutex::new(seed::todos()), offline: false };
        let (mut board, _) = Board::load(api, LocalCache::new(&path)).await;

        let notice = board.add(NewTodo { title: "Buy milk".into(), assigned_to: "Mom".into(), assigned_to_color: "#ec4899".into(), ..NewTodo::default() }).await;
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(board.todos[0].title, "Buy milk");

        let id = TodoId::from("1");
        let notice = board.toggle_completed(&id).await.unwrap();
        assert_eq!(notice.title, "Task completed!");
        assert!(board.find(&id).unwrap().completed);
        assert!(board.toggle_completed(&id).await.is_none());

        assert!(board.remove(&id).await.is_some());
        assert!(board.find(&id).is_none());
        assert!(board.remove(&id).await.is_none());
        assert_eq!(LocalCache::new(&path).load(), board.todos);
    }

    #[test]
    fn groups_by_due_date() {
        let todos = seed::todos();
        // Seed: 1 due 16th, 2 due 17th, 3 completed, 4 no date, 5 due 16th.
        let groups = group_by_due(todos.iter().collect(), day(16));
        let ids = |g: &[&Todo]| g.iter().map(|t| t.id.0.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&groups.today), ["1", "5"]);
        assert_eq!(ids(&groups.tomorrow), ["2"]);
        assert_eq!(ids(&groups.completed), ["3"]);
        assert_eq!(ids(&groups.no_due_date), ["4"]);
        assert!(groups.overdue.is_empty() && groups.upcoming.is_empty());

        let later = group_by_due(todos.iter().collect(), day(17));
        assert_eq!(ids(&later.overdue), ["1", "5"]);
        let earlier = group_by_due(todos.iter().collect(), day(14));
        assert_eq!(ids(&earlier.upcoming), ["1", "2", "5"]);
    }

    #[tokio::test]
    async fn filters_and_progress() {
        let dir = tempfile::tempdir().unwrap();
        let api = ScriptedApi { todos: Mutex::new(seed::todos()), offline: false };
        let (mut board, _) = Board::load(api, LocalCache::new(dir.path().join("todos.json"))).await;

        assert_eq!(board.progress(day(16)), Progress { total: 5, completed: 1, due_today: 3 });
        assert_eq!(board.pending_count_for("Mom"), 2);

        board.status = StatusFilter::Active;
        assert_eq!(board.visible().len(), 4);
        board.cycle_member();
        board.cycle_member();
        assert_eq!(board.member, MemberFilter::Named("Mom".into()));
        assert_eq!(board.visible().len(), 2);
        board.status = StatusFilter::Completed;
        assert!(board.visible().is_empty());
    }

    #[tokio::test]
    async fn added_todo_lands_in_the_chosen_due_group() {
        let dir = tempfile::tempdir().unwrap();
        let api = ScriptedApi::default();
        let (mut board, _) = Board::load(api, LocalCache::new(dir.path().join("todos.json"))).await;

        let due = DueChoice::None.next().next();
        assert_eq!(due, DueChoice::Tomorrow);
        assert_eq!(due.next(), DueChoice::None);
        let input = NewTodo {
            title: "Return library books".into(),
            assigned_to: "Son".into(),
            assigned_to_color: "#10b981".into(),
            due_date: due.date(day(31)),
            ..NewTodo::default()
        };
        board.add(input).await;

        let groups = board.groups(day(31));
        assert_eq!(groups.tomorrow.len(), 1);
        assert_eq!(groups.tomorrow[0].due_date, NaiveDate::from_ymd_opt(2025, 11, 1));
        assert_eq!(DueChoice::None.date(day(31)), None);
    }
}

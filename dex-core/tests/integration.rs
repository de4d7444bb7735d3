use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::tempdir;

use dex_core::codec;
use dex_core::error::DexError;
use dex_core::model::{Effort, Flag, Importance, Status};
use dex_core::project::TASKS_SUBDIR;
use dex_core::rank::RankOptions;
use dex_core::{DexConfig, NewTask, ProjectSet, StatusChange, Task};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

fn new_task(name: &str, effort: u8, importance: u8) -> NewTask {
    NewTask::new(
        name,
        Effort::new(effort).unwrap(),
        Importance::new(importance).unwrap(),
    )
    .with_due(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap())
}

fn init_root(projects: &[&str]) -> tempfile::TempDir {
    let root = tempdir().unwrap();
    for name in projects {
        fs::create_dir_all(root.path().join(name).join(TASKS_SUBDIR)).unwrap();
        fs::create_dir_all(root.path().join(name).join("notes")).unwrap();
    }
    root
}

fn last_line(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .last()
        .unwrap()
        .to_string()
}

#[test]
fn test_full_lifecycle() {
    let root = init_root(&["home"]);
    let mut set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();

    // Create
    let project = set.project_mut('a').unwrap();
    let id = project
        .create_task(new_task("fix sink", 2, 4).with_content("Washer is gone."), None)
        .unwrap()
        .id();
    assert_eq!(id.to_string(), "a1");

    let path = project.tasks_dir().join("fix sink.md");
    assert_eq!(
        last_line(&path),
        "[dexcode]: # {[a1|e2|d2026-11-01|i4|s1|fn]}"
    );

    // Start, then complete: the file moves to inactive/
    let task = set.find_task_mut(id).unwrap();
    assert_eq!(task.start().unwrap(), StatusChange::InPlace);
    let change = task.complete().unwrap();
    assert!(matches!(change, StatusChange::Relocated { .. }));
    assert!(!path.exists());

    let done_path = root
        .path()
        .join("home")
        .join(TASKS_SUBDIR)
        .join("inactive")
        .join("fix sink.md");
    assert_eq!(task.path(), done_path.as_path());
    assert!(last_line(&done_path).ends_with("|s3|fn]}"));

    // A fresh load agrees with what is on disk
    let set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();
    let reloaded = set.find_task(id).unwrap();
    assert!(reloaded.is_done());
    assert_eq!(reloaded.content(), "Washer is gone.");
    assert_eq!(set.project('a').unwrap().next_task_id().unwrap().to_string(), "a2");
}

#[test]
fn test_metadata_roundtrip_scenario() {
    let tag = codec::encode_raw("c3", 2, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 4, "done", &["n"])
        .unwrap();
    let code = codec::decode(&tag).unwrap();
    assert_eq!(code.id.to_string(), "c3");
    assert_eq!(code.effort.get(), 2);
    assert_eq!(code.due, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(code.importance.get(), 4);
    assert_eq!(code.status, Status::Done);
    assert_eq!(code.flags.iter().collect::<Vec<_>>(), vec![&Flag::NonRecurring]);
}

#[test]
fn test_create_done_is_rejected_before_writing() {
    let root = init_root(&["home"]);
    let mut set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();
    let project = set.project_mut('a').unwrap();

    let err = project
        .create_task(new_task("finished", 1, 1).with_status(Status::Done), None)
        .unwrap_err();
    assert!(matches!(err, DexError::Validation { .. }));
    assert_eq!(fs::read_dir(project.tasks_dir()).unwrap().count(), 0);
    assert!(project.tasks().is_empty());
}

#[test]
fn test_ranking_across_projects() {
    let root = init_root(&["garden", "home", "work"]);
    let mut set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();

    set.project_mut('a').unwrap().create_task(new_task("weed", 2, 3), None).unwrap();
    set.project_mut('b').unwrap().create_task(new_task("dishes", 2, 1), None).unwrap();
    set.project_mut('c').unwrap().create_task(new_task("report", 2, 5), None).unwrap();
    set.project_mut('c').unwrap().create_task(new_task("someday", 2, 5).with_status(Status::Hold), None).unwrap();

    let options = RankOptions::new(today());
    let names = |tasks: Vec<&Task>| tasks.iter().map(|t| t.name().to_string()).collect::<Vec<_>>();

    assert_eq!(
        names(set.rank(None, &options).unwrap()),
        vec!["report", "weed", "dishes", "someday"]
    );
    assert_eq!(
        names(set.rank(Some(&['a', 'b'][..]), &options).unwrap()),
        vec!["weed", "dishes"]
    );
    assert_eq!(
        names(set.rank(None, &options.with_limit(2)).unwrap()),
        vec!["report", "weed"]
    );
}

#[test]
fn test_hold_ranks_below_todo() {
    let root = init_root(&["home"]);
    let mut set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();
    let project = set.project_mut('a').unwrap();
    project.create_task(new_task("big", 1, 5).with_status(Status::Hold), None).unwrap();
    project.create_task(new_task("small", 5, 1), None).unwrap();

    let ranked = project.rank(&RankOptions::new(today()));
    assert_eq!(ranked[0].name(), "small");
    assert_eq!(ranked[1].name(), "big");
}

#[test]
fn test_hand_written_files_survive_loading() {
    let root = init_root(&["home"]);
    let tasks_dir = root.path().join("home").join(TASKS_SUBDIR);
    fs::write(tasks_dir.join("scratch.md"), "# ideas\n").unwrap();
    fs::write(tasks_dir.join("notes.txt"), "ignored entirely").unwrap();

    let config = DexConfig::default();
    let mut set = ProjectSet::open(root.path(), &config).unwrap();
    let project = set.project_mut('a').unwrap();
    assert_eq!(project.untracked().len(), 1);

    let scratch = tasks_dir.join("scratch.md");
    let adopted = project
        .adopt(&scratch, config.new_task("unused", Effort::new(3).unwrap(), Importance::new(2).unwrap(), today()))
        .unwrap();
    assert_eq!(adopted.name(), "scratch");
    assert_eq!(adopted.due(), NaiveDate::from_ymd_opt(2027, 10, 15).unwrap());

    let set = ProjectSet::open(root.path(), &config).unwrap();
    assert!(set.project('a').unwrap().untracked().is_empty());
    assert_eq!(set.project('a').unwrap().tasks().len(), 1);
}

#[test]
fn test_recurrence_flag_persists() {
    let root = init_root(&["home"]);
    let mut set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();
    let project = set.project_mut('a').unwrap();
    let id = project.create_task(new_task("water plants", 1, 2), None).unwrap().id();

    let task = project.task_mut(id).unwrap();
    task.set_recurrence(Some(7)).unwrap();
    assert!(last_line(task.path()).ends_with("|fr7]}"));

    let reloaded = Task::from_file(task.path()).unwrap();
    assert_eq!(reloaded.recurrence(), Some(7));
}

#[test]
fn test_out_of_range_recurrence_never_reaches_disk() {
    let root = init_root(&["home"]);
    let mut set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();
    let project = set.project_mut('a').unwrap();
    let id = project.create_task(new_task("stretch", 1, 2), None).unwrap().id();

    assert!(Flag::recurring_after(0).is_err());
    assert!(Flag::recurring_after(9999).is_err());

    let task = project.task_mut(id).unwrap();
    task.add_flag(Flag::recurring_after(365).unwrap()).unwrap();
    assert!(task.set_recurrence(Some(0)).is_err());

    // the project still loads after every flag change
    let set = ProjectSet::open(root.path(), &DexConfig::default()).unwrap();
    assert_eq!(set.find_task(id).unwrap().flags().len(), 2);
}

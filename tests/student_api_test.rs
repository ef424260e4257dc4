// ==========================================
// StudentApi 集成测试
// ==========================================
// 测试目标: 学生 CRUD、分页/搜索/分组、考勤成绩评语、统计、级联删除
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use student_tracker::api::ApiError;
use student_tracker::domain::{NewClassSession, StudentQuery};
use student_tracker::logging;
use student_tracker::AttendanceStatus;
use test_helpers::{create_test_env, matricule, sample_student};

fn class_on(day: u32) -> NewClassSession {
    NewClassSession::new("Algorithmique", NaiveDate::from_ymd_opt(2024, 3, day).unwrap())
        .with_group("G1")
}

// ==========================================
// 学生档案
// ==========================================

#[test]
fn test_duplicate_add_is_rejected_and_keeps_single_row() {
    logging::init_test();
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(1, "G1")).unwrap();
    assert!(id > 0);

    let err = api.add_student(&sample_student(1, "G2")).unwrap_err();
    match &err {
        ApiError::DuplicateKey(msg) => {
            assert_eq!(msg, &format!("Student with matricule {} already exists", matricule(1)));
        }
        other => panic!("Expected DuplicateKey, got {other:?}"),
    }
    assert!(err.is_user_recoverable());
    assert_eq!(api.count_students().unwrap(), 1);

    // 原记录未被修改
    let stored = api.get_student(id).unwrap();
    assert_eq!(stored.group.as_deref(), Some("G1"));
}

#[test]
fn test_add_rejects_invalid_matricule_and_blank_names() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let mut short = sample_student(1, "G1");
    short.matricule = "12345".to_string();
    assert!(matches!(
        api.add_student(&short),
        Err(ApiError::ValidationError(_))
    ));

    let mut letters = sample_student(2, "G1");
    letters.matricule = "2024ABCD0001".to_string();
    assert!(matches!(
        api.add_student(&letters),
        Err(ApiError::ValidationError(_))
    ));

    let mut blank = sample_student(3, "G1");
    blank.first_name = "   ".to_string();
    match api.add_student(&blank) {
        Err(ApiError::ValidationError(msg)) => {
            assert_eq!(msg, "Last name and first name are required")
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }

    assert_eq!(api.count_students().unwrap(), 0);
}

#[test]
fn test_pagination_search_and_groups() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    for n in 1..=12 {
        let group = if n <= 7 { "G1" } else { "G2" };
        api.add_student(&sample_student(n, group)).unwrap();
    }

    // 每页 5 条，按姓排序
    let first = api.list_page(None, None, 0).unwrap();
    assert_eq!(first.total_count, 12);
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.items[0].last_name, "Nom01");

    let last = api.list_page(None, None, 2).unwrap();
    assert_eq!(last.total_count, 12);
    assert_eq!(last.items.len(), 2);
    assert_eq!(last.items[1].last_name, "Nom12");

    // 分组过滤，总数为过滤后的总数
    let g2 = api.list_page(Some("G2"), None, 0).unwrap();
    assert_eq!(g2.total_count, 5);
    assert!(g2.items.iter().all(|s| s.group.as_deref() == Some("G2")));

    // 子串搜索区分大小写
    let hits = api
        .list_students(&StudentQuery::default().search("Nom1"))
        .unwrap();
    assert_eq!(hits.total_count, 3);
    let misses = api
        .list_students(&StudentQuery::default().search("nom1"))
        .unwrap();
    assert_eq!(misses.total_count, 0);

    // 按学号片段 + 分组组合过滤
    let by_matricule = api
        .list_students(&StudentQuery::default().in_group("G1").search("0000000"))
        .unwrap();
    assert_eq!(by_matricule.total_count, 7);

    // LIKE 通配符
    let wildcard = api
        .list_students(&StudentQuery::default().search("Nom0_"))
        .unwrap();
    assert_eq!(wildcard.total_count, 9);

    assert_eq!(api.list_groups().unwrap(), vec!["G1", "G2"]);
}

#[test]
fn test_page_number_out_of_range_is_rejected() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;
    api.add_student(&sample_student(1, "G1")).unwrap();

    match api.list_page(None, None, i64::MAX) {
        Err(ApiError::ValidationError(msg)) => assert!(msg.contains("out of range")),
        other => panic!("Expected ValidationError, got {other:?}"),
    }

    // 偏移量未溢出但超出数据范围: 空页，总数不变
    let beyond = api.list_page(None, None, 1_000_000).unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_count, 1);

    // 负页码按第 0 页处理
    let negative = api.list_page(None, None, -3).unwrap();
    assert_eq!(negative.items.len(), 1);
}

#[test]
fn test_update_student_and_matricule_collision() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let a = api.add_student(&sample_student(1, "G1")).unwrap();
    let b = api.add_student(&sample_student(2, "G1")).unwrap();

    let mut changed = sample_student(2, "G3");
    changed.last_name = "Martin".to_string();
    api.update_student(b, &changed).unwrap();
    let stored = api.get_student(b).unwrap();
    assert_eq!(stored.last_name, "Martin");
    assert_eq!(stored.group.as_deref(), Some("G3"));

    // 改成已存在的学号
    let collision = sample_student(1, "G1");
    assert!(matches!(
        api.update_student(b, &collision),
        Err(ApiError::DuplicateKey(_))
    ));
    assert_eq!(api.get_student(a).unwrap().matricule, matricule(1));
    assert_eq!(api.get_student(b).unwrap().matricule, matricule(2));

    assert!(matches!(
        api.update_student(9999, &sample_student(5, "G1")),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_find_by_matricule_and_missing_student() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(4, "G1")).unwrap();
    let found = api.find_by_matricule(&matricule(4)).unwrap().unwrap();
    assert_eq!(found.id, id);
    assert!(api.find_by_matricule(&matricule(5)).unwrap().is_none());

    match api.get_student(424242) {
        Err(ApiError::NotFound(msg)) => assert!(msg.contains("424242")),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

// ==========================================
// 考勤 / 成绩 / 评语 / 统计
// ==========================================

#[test]
fn test_statistics_with_no_classes_are_zero() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(1, "G1")).unwrap();
    let stats = api.student_statistics(id).unwrap();

    assert_eq!(stats.student_id, id);
    assert_eq!(stats.total_classes, 0);
    assert_eq!(stats.attendance_rate, 0.0);
    assert_eq!(stats.total_marks, 0);
    assert_eq!(stats.average_score, 0.0);
    assert_eq!(stats.highest_score, 0.0);
    assert_eq!(stats.lowest_score, 0.0);
}

#[test]
fn test_statistics_from_attendance_and_marks() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(1, "G1")).unwrap();
    let c1 = api.create_class(&class_on(1)).unwrap();
    let c2 = api.create_class(&class_on(8)).unwrap();
    let c3 = api.create_class(&class_on(15)).unwrap();
    let c4 = api.create_class(&class_on(22)).unwrap();

    api.record_attendance(id, c1, AttendanceStatus::Present).unwrap();
    api.record_attendance(id, c2, AttendanceStatus::Absent).unwrap();
    api.record_attendance(id, c3, AttendanceStatus::JustifiedAbsent).unwrap();
    api.record_attendance(id, c4, AttendanceStatus::Absent).unwrap();
    // 同一课次再次记录覆盖原状态
    api.record_attendance(id, c4, AttendanceStatus::Present).unwrap();

    api.set_mark(id, c1, Some(12.0)).unwrap();
    api.set_mark(id, c2, Some(15.5)).unwrap();
    api.set_mark_text(id, c3, "9").unwrap();
    // 空分数计入成绩条数，不参与平均/最高/最低
    api.set_mark_text(id, c4, "").unwrap();

    let stats = api.student_statistics(id).unwrap();
    assert_eq!(stats.total_classes, 4);
    assert_eq!(stats.present_count, 2);
    assert_eq!(stats.absent_count, 1);
    assert_eq!(stats.justified_count, 1);
    assert_eq!(stats.attendance_rate, 50.0);
    assert_eq!(stats.total_marks, 4);
    assert_eq!(stats.average_score, 12.17);
    assert_eq!(stats.highest_score, 15.5);
    assert_eq!(stats.lowest_score, 9.0);

    assert_eq!(api.attendance_for_student(id).unwrap().len(), 4);
    assert_eq!(api.marks_for_student(id).unwrap().len(), 4);
}

#[test]
fn test_empty_mark_counts_without_affecting_scores() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(1, "G1")).unwrap();
    let class_id = api.create_class(&class_on(1)).unwrap();
    api.set_mark(id, class_id, None).unwrap();

    let stats = api.student_statistics(id).unwrap();
    assert_eq!(stats.total_marks, 1);
    assert_eq!(stats.average_score, 0.0);
    assert_eq!(stats.highest_score, 0.0);
    assert_eq!(stats.lowest_score, 0.0);
}

#[test]
fn test_mark_out_of_range_is_rejected() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(1, "G1")).unwrap();
    let class_id = api.create_class(&class_on(1)).unwrap();

    assert!(matches!(
        api.set_mark(id, class_id, Some(20.5)),
        Err(ApiError::ValidationError(_))
    ));
    assert!(matches!(
        api.set_mark_text(id, class_id, "abc"),
        Err(ApiError::ValidationError(_))
    ));
    assert!(api.marks_for_student(id).unwrap().is_empty());
}

#[test]
fn test_records_for_unknown_student_are_not_found() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;
    let class_id = api.create_class(&class_on(1)).unwrap();

    assert!(matches!(
        api.record_attendance(777, class_id, AttendanceStatus::Present),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.student_statistics(777),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_comments_lifecycle() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(1, "G1")).unwrap();
    let class_id = api.create_class(&class_on(1)).unwrap();

    let first = api.add_comment(id, class_id, "  Bonne participation ").unwrap();
    api.add_comment(id, class_id, "Devoir rendu en retard").unwrap();
    assert!(matches!(
        api.add_comment(id, class_id, "   "),
        Err(ApiError::ValidationError(_))
    ));

    let comments = api.comments_for_class(id, class_id).unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().any(|c| c.text == "Bonne participation"));

    api.delete_comment(first).unwrap();
    assert_eq!(api.comments_for_student(id).unwrap().len(), 1);
    assert!(matches!(
        api.delete_comment(first),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_delete_student_cascades_only_own_records() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let a = api.add_student(&sample_student(1, "G1")).unwrap();
    let b = api.add_student(&sample_student(2, "G1")).unwrap();
    let class_id = api.create_class(&class_on(1)).unwrap();

    for student in [a, b] {
        api.record_attendance(student, class_id, AttendanceStatus::Present)
            .unwrap();
        api.set_mark(student, class_id, Some(14.0)).unwrap();
        api.add_comment(student, class_id, "RAS").unwrap();
    }

    api.delete_student(a).unwrap();

    assert!(matches!(api.get_student(a), Err(ApiError::NotFound(_))));
    assert!(api.attendance_for_student(a).unwrap().is_empty());
    assert!(api.marks_for_student(a).unwrap().is_empty());
    assert!(api.comments_for_student(a).unwrap().is_empty());

    assert_eq!(api.attendance_for_student(b).unwrap().len(), 1);
    assert_eq!(api.marks_for_student(b).unwrap().len(), 1);
    assert_eq!(api.comments_for_student(b).unwrap().len(), 1);
    assert_eq!(api.count_students().unwrap(), 1);

    // 再次删除
    assert!(matches!(api.delete_student(a), Err(ApiError::NotFound(_))));
}

#[test]
fn test_delete_class_cascades_records() {
    let env = create_test_env().unwrap();
    let api = &env.state.student_api;

    let id = api.add_student(&sample_student(1, "G1")).unwrap();
    let keep = api.create_class(&class_on(1)).unwrap();
    let dropped = api.create_class(&class_on(2)).unwrap();
    api.record_attendance(id, keep, AttendanceStatus::Present).unwrap();
    api.record_attendance(id, dropped, AttendanceStatus::Absent).unwrap();

    api.delete_class(dropped).unwrap();

    let classes = api.list_classes(Some("G1")).unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, keep);
    let stats = api.student_statistics(id).unwrap();
    assert_eq!(stats.total_classes, 1);
    assert_eq!(stats.attendance_rate, 100.0);
}

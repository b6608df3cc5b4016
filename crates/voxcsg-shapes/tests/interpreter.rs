use glam::{DVec3, IVec3};
use voxcsg_core::bounds::GridBounds;
use voxcsg_core::shape::{Parameters, PrimitiveKind, Role};
use voxcsg_shapes::expr::ExprError;
use voxcsg_shapes::loader::load_shape_from_str;
use voxcsg_shapes::{Interpreter, ShapeError, ShapeLibrary};
use voxcsg_world::Scene;

fn scene() -> Scene {
    Scene::headless(GridBounds::new(300))
}

fn box_params() -> Parameters {
    [
        ("inner_length", 100.0),
        ("inner_width", 40.0),
        ("wall_thickness", 3.2),
        ("inner_height", 50.0),
        ("screw_distance_from_edge", 5.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn library_with(ron: &str) -> ShapeLibrary {
    let mut library = ShapeLibrary::builtin().expect("builtin shapes");
    library.insert(load_shape_from_str(ron).expect("test shape"));
    library
}

fn assert_close(a: DVec3, b: DVec3) {
    assert!((a - b).abs().max_element() < 1e-9, "{a} != {b}");
}

#[test]
fn test_box_scenario_six_calls() {
    let interpreter = Interpreter::new(ShapeLibrary::builtin().unwrap());
    let mut scene = scene();
    let report = interpreter
        .interpret(&mut scene, "box", IVec3::ZERO, &box_params(), None)
        .expect("box draws");

    let roles: Vec<Option<Role>> = report.operations.iter().map(|o| o.role).collect();
    assert_eq!(
        roles,
        vec![
            Some(Role::Shell),
            Some(Role::Cavity),
            Some(Role::OpenTop),
            Some(Role::Lid),
            Some(Role::ScrewBoss),
            Some(Role::ScrewHole),
        ]
    );
    let kinds: Vec<PrimitiveKind> = report.operations.iter().map(|o| o.primitive).collect();
    assert_eq!(&kinds[..4], &[PrimitiveKind::Cube; 4]);
    assert_eq!(&kinds[4..], &[PrimitiveKind::Cylinder; 2]);
    let negatives: Vec<bool> = report.operations.iter().map(|o| o.negative).collect();
    assert_eq!(negatives, vec![false, true, true, false, false, true]);

    let centers: Vec<DVec3> = report.operations.iter().map(|o| o.center).collect();
    assert_close(centers[0], DVec3::new(53.2, 23.2, 26.6));
    assert_close(centers[1], DVec3::new(53.2, 23.2, 28.2));
    assert_close(centers[2], DVec3::new(53.2, 23.2, 51.6));
    assert_close(centers[3], DVec3::new(164.6, 23.2, 1.6));
    assert_close(centers[4], DVec3::new(8.2, 23.2, 0.0));
    assert_close(centers[5], DVec3::new(8.2, 23.2, 0.0));

    assert!(report.operations.iter().all(|o| o.voxels > 0));
    assert!(report.canonical > 0);
    assert_eq!(report.canonical, scene.voxels().len());

    let voxels = scene.voxels();
    // Floor stays, cavity is hollow.
    assert!(voxels.contains(IVec3::new(50, 20, 0)));
    assert!(!voxels.contains(IVec3::new(50, 20, 10)));
    // Screw boss ring around an empty hole.
    assert!(voxels.contains(IVec3::new(11, 23, 10)));
    assert!(!voxels.contains(IVec3::new(8, 23, 10)));
    // Lid sits beside the shell.
    assert!(voxels.contains(IVec3::new(150, 23, 1)));
    assert!(!voxels.contains(IVec3::new(109, 23, 1)));
}

#[test]
fn test_caller_params_override_defaults() {
    let interpreter = Interpreter::new(ShapeLibrary::builtin().unwrap());
    let mut scene = scene();
    let params: Parameters = [("inner_length".to_string(), 20.0)].into_iter().collect();
    let report = interpreter
        .interpret(&mut scene, "box", IVec3::new(10, 10, 10), &params, None)
        .unwrap();
    // Outer length 23.2 with the default 1.6 wall.
    assert_close(report.operations[3].center, DVec3::new(10.0 + 23.2 + 5.0 + 11.6, 31.6, 10.8));
}

#[test]
fn test_negative_override_forces_subtraction() {
    let interpreter = Interpreter::new(ShapeLibrary::builtin().unwrap());
    let mut scene = scene();
    interpreter
        .interpret(&mut scene, "box", IVec3::ZERO, &Parameters::new(), None)
        .unwrap();
    assert!(!scene.voxels().is_empty());

    let report = interpreter
        .interpret(&mut scene, "box", IVec3::ZERO, &Parameters::new(), Some(true))
        .unwrap();
    assert!(report.operations.iter().all(|o| o.negative));
    assert!(scene.voxels().is_empty());
}

#[test]
fn test_unknown_shape() {
    let interpreter = Interpreter::new(ShapeLibrary::builtin().unwrap());
    let err = interpreter
        .interpret(&mut scene(), "sphere", IVec3::ZERO, &Parameters::new(), None)
        .unwrap_err();
    assert!(matches!(err, ShapeError::UnknownShape(name) if name == "sphere"));
}

#[test]
fn test_unsupported_kind() {
    let library = library_with(r#"(name: "mesh", kind: "imported", operations: [])"#);
    let err = Interpreter::new(library)
        .interpret(&mut scene(), "mesh", IVec3::ZERO, &Parameters::new(), None)
        .unwrap_err();
    assert!(matches!(err, ShapeError::UnsupportedKind(kind) if kind == "imported"));
}

#[test]
fn test_evaluation_error_keeps_prior_voxels() {
    let library = library_with(
        r#"(name: "broken", kind: "custom", operations: [
            Cube(length: "2", width: "2", height: "2"),
            Cube(length: "1 / 0", width: "2", height: "2"),
            Cube(length: "9", width: "9", height: "9"),
        ])"#,
    );
    let mut scene = scene();
    let err = Interpreter::new(library)
        .interpret(&mut scene, "broken", IVec3::splat(10), &Parameters::new(), None)
        .unwrap_err();
    assert!(matches!(err, ShapeError::Evaluation(ExprError::DivisionByZero)));
    assert_eq!(scene.voxels().len(), 27);
}

#[test]
fn test_unsupported_operation_aborts() {
    let library = library_with(
        r#"(name: "odd", kind: "custom", operations: [
            Cylinder(radius: "0", height: "3"),
            Unsupported(kind: "sphere"),
        ])"#,
    );
    let mut scene = scene();
    let err = Interpreter::new(library)
        .interpret(&mut scene, "odd", IVec3::splat(5), &Parameters::new(), None)
        .unwrap_err();
    assert!(matches!(err, ShapeError::UnsupportedOperation(_)));
    assert_eq!(scene.voxels().len(), 4);
}

#[test]
fn test_role_mismatch_rejected() {
    let library = library_with(
        r#"(name: "mixed", kind: "custom", parameters: {"wall_thickness": 1.0, "inner_length": 1.0,
            "inner_width": 1.0, "inner_height": 1.0},
            operations: [Cylinder(radius: "1", height: "1", placement: Computed(Shell))])"#,
    );
    let err = Interpreter::new(library)
        .interpret(&mut scene(), "mixed", IVec3::ZERO, &Parameters::new(), None)
        .unwrap_err();
    assert!(matches!(err, ShapeError::UnsupportedOperation(_)));
}

#[test]
fn test_missing_frame_parameter() {
    let library = library_with(
        r#"(name: "loose", kind: "custom", operations: [
            Cube(length: "1", width: "1", height: "1", placement: Computed(Shell)),
        ])"#,
    );
    let err = Interpreter::new(library)
        .interpret(&mut scene(), "loose", IVec3::ZERO, &Parameters::new(), None)
        .unwrap_err();
    assert!(matches!(err, ShapeError::MissingParameter(name) if name == "wall_thickness"));
}

#[test]
fn test_explicit_placement_uses_origin() {
    let library = library_with(
        r#"(name: "post", kind: "custom", parameters: {"h": 4.0}, operations: [
            Cylinder(radius: "1", height: "h"),
        ])"#,
    );
    let report = Interpreter::new(library)
        .interpret(&mut scene(), "post", IVec3::new(20, 30, 40), &Parameters::new(), None)
        .unwrap();
    assert_close(report.operations[0].center, DVec3::new(20.0, 30.0, 40.0));
    // Five cells of the unit disc on five layers.
    assert_eq!(report.operations[0].voxels, 25);
}

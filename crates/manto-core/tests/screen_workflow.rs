//! End-to-end descriptor screening scenarios over small synthetic molecules.

use mantoqsar::core::models::atom::Atom;
use mantoqsar::core::models::descriptor::{DescriptorGroup, GroupKind};
use mantoqsar::core::models::molecule::{Molecule, Residue};
use mantoqsar::core::models::observation::{Condition, Observation};
use mantoqsar::engine::batch::{CheckpointStore, ObservationResult, SurfaceProvider};
use mantoqsar::engine::config::{
    DescriptorKind, DescriptorScaling, DescriptorSet, Kernel, ProjectionParams, SelectMode,
    SurfaceParams, SurfaceProperty,
};
use mantoqsar::engine::context::ScreenContext;
use mantoqsar::engine::error::CalcError;
use mantoqsar::engine::progress::ProgressReporter;
use mantoqsar::workflows::screen::{self, ScreenOptions};
use nalgebra::Point3;
use std::sync::Mutex;

struct StaticSurface {
    points: Vec<Point3<f64>>,
}

impl SurfaceProvider for StaticSurface {
    fn surface(
        &self,
        _observation: &Observation,
        _molecule: &Molecule,
        _params: &SurfaceParams,
    ) -> Result<Vec<Point3<f64>>, CalcError> {
        Ok(self.points.clone())
    }
}

#[derive(Default)]
struct MemoryStore {
    data: Mutex<Vec<ObservationResult>>,
}

impl CheckpointStore for MemoryStore {
    fn load(&self) -> Result<Vec<ObservationResult>, CalcError> {
        Ok(self.data.lock().unwrap().clone())
    }

    fn save(&self, results: &[ObservationResult]) -> Result<(), CalcError> {
        *self.data.lock().unwrap() = results.to_vec();
        Ok(())
    }
}

fn four_point_surface() -> StaticSurface {
    StaticSurface {
        points: vec![
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(-3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
        ],
    }
}

fn neutral_molecule() -> Molecule {
    let a = Atom::new("CA", "C", Point3::new(0.5, 0.0, 0.0));
    let b = Atom::new("N", "N", Point3::new(-0.5, 0.0, 0.0));
    Molecule::new(vec![Residue::new("GLY", vec![a, b])])
}

fn observation(name: &str, response: Option<f64>, active: bool) -> Observation {
    Observation {
        name: name.to_string(),
        file: format!("{name}.pqr"),
        species: None,
        condition: Condition::default(),
        response,
        active,
        predict: false,
        note: None,
    }
}

fn surface_set() -> DescriptorSet {
    DescriptorSet {
        surface: SurfaceParams {
            resolution: 0.5,
            probe_radius: 1.4,
            property: SurfaceProperty::Esp,
            kernel: Kernel::InverseDistance,
        },
        kind: DescriptorKind::Surface,
        descriptor: DescriptorScaling {
            name: "esp".to_string(),
            bin_width: 1.0,
        },
    }
}

fn projection_params(orientations: usize, reuse: bool) -> ProjectionParams {
    ProjectionParams {
        size: 10.0,
        density: 5.0,
        distance: 3.0,
        kernel: Kernel::InverseDistance,
        orientations,
        select_id: "meanSurfA".to_string(),
        select_mode: SelectMode::Max,
        reuse_orientations: reuse,
    }
}

fn value_of(group: &DescriptorGroup, name_part: &str) -> f64 {
    group
        .descriptors
        .iter()
        .find(|d| d.name().contains(name_part))
        .unwrap_or_else(|| panic!("no descriptor matching {name_part}"))
        .value()
}

#[test]
fn all_zero_scalar_field_produces_all_zero_statistics() {
    // Both atoms carry zero occupancy, so the mapped field is zero at every
    // surface point.
    let mut ctx = ScreenContext::new(
        vec![surface_set()],
        vec![observation("zero", Some(1.0), true)],
        vec![neutral_molecule()],
    )
    .unwrap();

    let result = screen::run(
        &mut ctx,
        &four_point_surface(),
        None,
        &ProgressReporter::new(),
        ScreenOptions::default(),
    )
    .unwrap();

    let group = &result.results[0][0];
    assert_eq!(group.kind, GroupKind::Surface);
    assert_eq!(group.len(), 28);
    assert_eq!(value_of(group, "sum_Esp"), 0.0);
    assert_eq!(value_of(group, "mean_Esp"), 0.0);
    assert_eq!(value_of(group, "max_Esp"), 0.0);
    assert_eq!(value_of(group, "min_Esp"), 0.0);
    assert_eq!(value_of(group, "nPos_Esp"), 0.0);
    assert_eq!(value_of(group, "nNeg_Esp"), 0.0);
    assert_eq!(value_of(group, "nSurfP_Esp"), 4.0);
}

#[test]
fn inactive_observations_keep_zero_filled_rows() {
    let mut ctx = ScreenContext::new(
        vec![surface_set()],
        vec![
            observation("first", Some(1.0), true),
            observation("missing-response", None, true),
            observation("second", Some(2.0), true),
        ],
        vec![neutral_molecule(), neutral_molecule(), neutral_molecule()],
    )
    .unwrap();

    let result = screen::run(
        &mut ctx,
        &four_point_surface(),
        None,
        &ProgressReporter::new(),
        ScreenOptions::default(),
    )
    .unwrap();

    assert_eq!(result.descriptor_matrix.rows(), 3);
    assert_eq!(result.descriptor_matrix.cols(), 28);
    assert!(result.results[1].is_empty());
    assert!(result.descriptor_matrix.row(1).iter().all(|v| *v == 0.0));

    // Model rows only include active observations with a response.
    assert_eq!(result.model_matrix.rows(), 2);
    assert_eq!(result.model_property, vec![1.0, 2.0]);
    assert_eq!(result.descriptor_names.len(), 28);
}

#[test]
fn parallel_and_sequential_batches_agree() {
    let build_ctx = || {
        ScreenContext::new(
            vec![surface_set()],
            vec![
                observation("a", Some(1.0), true),
                observation("b", Some(2.0), true),
            ],
            vec![neutral_molecule(), neutral_molecule()],
        )
        .unwrap()
    };

    let mut sequential_ctx = build_ctx();
    let sequential = screen::run(
        &mut sequential_ctx,
        &four_point_surface(),
        None,
        &ProgressReporter::new(),
        ScreenOptions { parallel: false },
    )
    .unwrap();

    let mut parallel_ctx = build_ctx();
    let parallel = screen::run(
        &mut parallel_ctx,
        &four_point_surface(),
        None,
        &ProgressReporter::new(),
        ScreenOptions { parallel: true },
    )
    .unwrap();

    assert_eq!(sequential.results, parallel.results);
    assert_eq!(sequential.descriptor_matrix, parallel.descriptor_matrix);
}

#[test]
fn checkpointed_batch_resumes_without_recomputing() {
    let store = MemoryStore::default();

    // Pre-load the store with a marker result for the first observation; a
    // resumed run must keep it instead of recomputing.
    let marker = vec![DescriptorGroup::placeholder(GroupKind::Shape)];
    store.save(std::slice::from_ref(&marker)).unwrap();

    let mut ctx = ScreenContext::new(
        vec![surface_set()],
        vec![
            observation("done", Some(1.0), true),
            observation("todo", Some(2.0), true),
        ],
        vec![neutral_molecule(), neutral_molecule()],
    )
    .unwrap();

    let result = screen::run(
        &mut ctx,
        &four_point_surface(),
        Some(&store),
        &ProgressReporter::new(),
        ScreenOptions::default(),
    )
    .unwrap();

    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0], marker);
    assert_eq!(result.results[1][0].kind, GroupKind::Surface);

    // The store now holds the completed batch.
    assert_eq!(store.load().unwrap(), result.results);
}

#[test]
fn orientation_sets_chain_through_descriptor_sets() {
    let plane_set = DescriptorSet {
        surface: surface_set().surface,
        kind: DescriptorKind::Plane(projection_params(3, false)),
        descriptor: DescriptorScaling {
            name: "esp".to_string(),
            bin_width: 1.0,
        },
    };
    let reusing_patch_set = DescriptorSet {
        surface: surface_set().surface,
        kind: DescriptorKind::Patch(ProjectionParams {
            size: 50.0,
            ..projection_params(7, true)
        }),
        descriptor: DescriptorScaling {
            name: "esp".to_string(),
            bin_width: 1.0,
        },
    };

    let mut molecule = neutral_molecule();
    // A charged atom so plane projections carry signal.
    let mut charged = Atom::new("O", "O", Point3::new(0.0, 0.5, 0.0));
    charged.occupancy = -1.0;
    molecule = {
        let mut residues = molecule.residues().to_vec();
        residues[0].atoms.push(charged);
        Molecule::new(residues)
    };

    let mut ctx = ScreenContext::new(
        vec![plane_set, reusing_patch_set, surface_set()],
        vec![observation("chained", Some(1.0), true)],
        vec![molecule],
    )
    .unwrap();

    let result = screen::run(
        &mut ctx,
        &four_point_surface(),
        None,
        &ProgressReporter::new(),
        ScreenOptions::default(),
    )
    .unwrap();

    let groups = &result.results[0];
    assert_eq!(groups.len(), 3);

    let plane_group = &groups[0];
    assert_eq!(plane_group.kind, GroupKind::Plane);
    assert_eq!(plane_group.len(), 32);
    assert_eq!(plane_group.detail.len(), 3);
    assert!(plane_group.orientation_index.unwrap() < 3);

    // The patch set reuses the plane set's orientations instead of sampling
    // its own seven.
    let patch_group = &groups[1];
    assert_eq!(patch_group.kind, GroupKind::Patch);
    assert_eq!(patch_group.len(), 28);
    assert_eq!(patch_group.orientations, plane_group.orientations);

    assert_eq!(groups[2].kind, GroupKind::Surface);
    assert_eq!(
        result.descriptor_matrix.cols(),
        32 + 28 + 28
    );
}

#[test]
fn failing_descriptor_set_degrades_to_a_placeholder_group() {
    // A patch radius this small catches no surface points, which fails the
    // statistic row and must yield a zero-filled placeholder, not abort the
    // batch.
    let bad_patch = DescriptorSet {
        surface: surface_set().surface,
        kind: DescriptorKind::Patch(ProjectionParams {
            size: 1e-6,
            ..projection_params(2, false)
        }),
        descriptor: DescriptorScaling {
            name: "esp".to_string(),
            bin_width: 1.0,
        },
    };

    let mut ctx = ScreenContext::new(
        vec![bad_patch, surface_set()],
        vec![observation("degraded", Some(1.0), true)],
        vec![neutral_molecule()],
    )
    .unwrap();

    let result = screen::run(
        &mut ctx,
        &four_point_surface(),
        None,
        &ProgressReporter::new(),
        ScreenOptions::default(),
    )
    .unwrap();

    let groups = &result.results[0];
    let placeholder = &groups[0];
    assert_eq!(placeholder.len(), 28);
    assert!(placeholder.detail.is_empty());
    assert!(placeholder.values().iter().all(|v| *v == 0.0));

    // The healthy set still computed, and row alignment survived.
    assert_eq!(groups[1].kind, GroupKind::Surface);
    assert_eq!(result.descriptor_matrix.cols(), 28 + 28);
}

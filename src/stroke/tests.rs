//! Stroke scenarios checked against a brute-force rescan of the plane.

use std::collections::BTreeSet;

use ndarray::Array2;

use super::*;
use crate::model::ClassProperty;
use crate::reconcile::scan_extent;

const CAR: ClassId = 2;
const ROAD: ClassId = 1;

fn catalog() -> ClassCatalog {
    ClassCatalog::with_default_classes()
}

fn square(size: usize) -> Array2<u8> {
    Array2::from_elem((size, size), 1)
}

fn single_pixel() -> Array2<u8> {
    Array2::from_elem((1, 1), 1)
}

struct Fixture {
    catalog: ClassCatalog,
    record: AnnotationRecord,
    plane: LabelPlane,
    frame: FrameNumber,
}

impl Fixture {
    fn new(width: usize, height: usize) -> Self {
        let catalog = catalog();
        Self {
            record: AnnotationRecord::with_class_capacity(catalog.len()),
            catalog,
            plane: LabelPlane::new(width, height),
            frame: 0,
        }
    }

    fn target(&mut self) -> FrameTarget<'_> {
        FrameTarget {
            record: &mut self.record,
            plane: &mut self.plane,
            frame: self.frame,
        }
    }

    fn paint(
        &mut self,
        cells: &Array2<u8>,
        x: isize,
        y: isize,
        class_id: ClassId,
        start: Option<(usize, usize)>,
    ) -> Result<PaintOutcome> {
        let mask = StrokeMask::new(cells.view(), x, y);
        let catalog = self.catalog.clone();
        paint(self.target(), &catalog, &mask, class_id, start)
    }

    fn erase(&mut self, cells: &Array2<u8>, x: isize, y: isize) -> ReconcileSummary {
        let mask = StrokeMask::new(cells.view(), x, y);
        erase(self.target(), &mask)
    }

    fn pixel_count(&self, class_id: ClassId, object_id: ObjectId) -> usize {
        self.plane
            .classes()
            .iter()
            .zip(self.plane.object_ids().iter())
            .filter(|&(&c, &o)| (c, o) == (class_id, object_id))
            .count()
    }

    fn bounding_box(&self, class_id: ClassId, object_id: ObjectId) -> Option<PixelRect> {
        self.record
            .lookup(self.frame, class_id, object_id)
            .and_then(|id| self.record.get(id))
            .map(|o| o.bounding_box)
    }

    /// Compare every record of the frame with a full rescan of the plane,
    /// and check that every labeled pixel belongs to a record.
    fn assert_matches_plane(&self) {
        assert_eq!(self.record.check_indexes(), Ok(()));

        let full = PixelRect::new(0, 0, self.plane.width(), self.plane.height());
        let recorded: BTreeSet<_> = self.record.frame_objects(self.frame).into_iter().collect();
        assert_eq!(
            recorded.len(),
            self.record.frame_record_ids(self.frame).len(),
            "duplicate records in frame"
        );

        for &(class_id, object_id) in &recorded {
            let expected = scan_extent(&self.plane, &full, class_id, object_id);
            assert_eq!(
                self.bounding_box(class_id, object_id),
                expected,
                "box of class {} object {}",
                class_id,
                object_id
            );
        }

        let mut labeled = BTreeSet::new();
        for row in 0..self.plane.height() {
            for col in 0..self.plane.width() {
                if let Some((class_id, object_id)) = self.plane.get(col, row) {
                    if class_id != CLASS_NONE {
                        labeled.insert((class_id, object_id));
                    }
                }
            }
        }
        assert_eq!(labeled, recorded);
    }
}

#[test]
fn test_scenario_two_cars_then_erase() {
    let mut fx = Fixture::new(10, 10);

    let first = fx.paint(&square(3), 0, 0, CAR, Some((0, 0))).unwrap();
    assert_eq!(first.object_id, 0);
    assert_eq!(fx.bounding_box(CAR, 0), Some(PixelRect::new(0, 0, 3, 3)));

    let second = fx.paint(&square(2), 5, 5, CAR, Some((5, 5))).unwrap();
    assert_eq!(second.object_id, 1);
    assert_eq!(fx.bounding_box(CAR, 1), Some(PixelRect::new(5, 5, 7, 7)));

    // Interior pixel: the fast path keeps the box
    let summary = fx.erase(&single_pixel(), 1, 1);
    assert_eq!(summary.untouched, 1);
    assert_eq!(summary.resized, 0);
    assert_eq!(fx.bounding_box(CAR, 0), Some(PixelRect::new(0, 0, 3, 3)));
    fx.assert_matches_plane();

    let summary = fx.erase(&square(3), 0, 0);
    assert_eq!(summary.removed, 1);
    assert_eq!(fx.record.lookup(0, CAR, 0), None);
    assert_eq!(fx.record.len(), 1);
    assert_eq!(fx.record.first_available_object_id(CAR), Some(0));
    fx.assert_matches_plane();
}

#[test]
fn test_repeated_paint_is_idempotent() {
    let mut fx = Fixture::new(8, 8);
    let cells = square(3);
    let once = fx.paint(&cells, 2, 1, ROAD, None).unwrap();
    let box_once = fx.bounding_box(ROAD, 0);
    let twice = fx.paint(&cells, 2, 1, ROAD, None).unwrap();

    assert_eq!(once.record_id, twice.record_id);
    assert_eq!(fx.record.len(), 1);
    assert_eq!(fx.bounding_box(ROAD, 0), box_once);
    assert_eq!(box_once, Some(PixelRect::new(2, 1, 5, 4)));
    fx.assert_matches_plane();
}

#[test]
fn test_uniform_class_always_uses_object_zero() {
    let mut fx = Fixture::new(10, 10);
    let a = fx.paint(&square(2), 0, 0, ROAD, None).unwrap();
    let b = fx.paint(&square(2), 6, 6, ROAD, Some((9, 9))).unwrap();
    assert_eq!(a.object_id, 0);
    assert_eq!(b.object_id, 0);
    assert_eq!(a.record_id, b.record_id);
    assert_eq!(fx.bounding_box(ROAD, 0), Some(PixelRect::new(0, 0, 8, 8)));
    fx.assert_matches_plane();
}

#[test]
fn test_stroke_starting_on_object_extends_it() {
    let mut fx = Fixture::new(10, 10);
    fx.paint(&square(2), 0, 0, CAR, None).unwrap();
    fx.paint(&square(2), 6, 6, CAR, None).unwrap();

    // Starts on object 1 and drags toward the bottom-right corner
    let extended = fx.paint(&square(3), 7, 7, CAR, Some((7, 7))).unwrap();
    assert_eq!(extended.object_id, 1);
    assert_eq!(fx.bounding_box(CAR, 1), Some(PixelRect::new(6, 6, 10, 10)));
    assert_eq!(fx.record.len(), 2);
    fx.assert_matches_plane();
}

#[test]
fn test_stroke_starting_on_other_class_gets_new_object() {
    let mut fx = Fixture::new(10, 10);
    fx.paint(&square(4), 0, 0, ROAD, None).unwrap();
    let car = fx.paint(&square(2), 1, 1, CAR, Some((1, 1))).unwrap();
    assert_eq!(car.object_id, 0);
    fx.assert_matches_plane();
}

#[test]
fn test_paint_over_edge_shrinks_other_object() {
    let mut fx = Fixture::new(10, 10);
    fx.paint(&square(4), 0, 0, ROAD, None).unwrap();

    // Cover the two right-most columns of the road with a car
    let cover = Array2::from_elem((4, 2), 1);
    let car = fx.paint(&cover, 2, 0, CAR, None).unwrap();
    assert_eq!(car.reconcile.resized, 1);
    assert_eq!(fx.bounding_box(ROAD, 0), Some(PixelRect::new(0, 0, 2, 4)));
    assert_eq!(fx.bounding_box(CAR, 0), Some(PixelRect::new(2, 0, 4, 4)));
    fx.assert_matches_plane();
}

#[test]
fn test_paint_covering_object_removes_it() {
    let mut fx = Fixture::new(10, 10);
    let small = fx.paint(&square(2), 3, 3, CAR, None).unwrap();
    assert_eq!(small.object_id, 0);

    let road = fx.paint(&square(6), 1, 1, ROAD, None).unwrap();
    assert_eq!(road.reconcile.removed, 1);
    assert_eq!(fx.record.lookup(0, CAR, 0), None);
    assert_eq!(fx.record.len(), 1);
    assert_eq!(road.record_id, 0);
    fx.assert_matches_plane();
}

#[test]
fn test_splitting_object_keeps_outer_box() {
    let mut fx = Fixture::new(10, 3);
    let bar = Array2::from_elem((1, 9), 1);
    fx.paint(&bar, 0, 1, CAR, None).unwrap();

    // Cut the bar in the middle; both halves keep the same id
    fx.erase(&single_pixel(), 4, 1);
    assert_eq!(fx.bounding_box(CAR, 0), Some(PixelRect::new(0, 1, 9, 2)));
    fx.assert_matches_plane();

    // Remove the right half: the box shrinks to the left one
    let right = Array2::from_elem((1, 4), 1);
    fx.erase(&right, 5, 1);
    assert_eq!(fx.bounding_box(CAR, 0), Some(PixelRect::new(0, 1, 4, 2)));
    fx.assert_matches_plane();
}

#[test]
fn test_object_with_hole_rescans_whole_box() {
    let mut fx = Fixture::new(9, 9);
    // A ring: hollow 5x5 square
    let mut ring = square(5);
    for row in 1..4 {
        for col in 1..4 {
            ring[(row, col)] = 0;
        }
    }
    fx.paint(&ring, 2, 2, CAR, None).unwrap();
    assert_eq!(fx.bounding_box(CAR, 0), Some(PixelRect::new(2, 2, 7, 7)));

    // Erase the left column of the ring
    let column = Array2::from_elem((5, 1), 1);
    fx.erase(&column, 2, 2);
    assert_eq!(fx.bounding_box(CAR, 0), Some(PixelRect::new(3, 2, 7, 7)));
    fx.assert_matches_plane();
}

#[test]
fn test_mask_clipped_to_plane() {
    let mut fx = Fixture::new(5, 5);
    let outcome = fx.paint(&square(4), -2, 3, CAR, None).unwrap();
    assert_eq!(outcome.bounding_box, PixelRect::new(0, 3, 2, 5));
    assert_eq!(fx.pixel_count(CAR, 0), 4);
    fx.assert_matches_plane();
}

#[test]
fn test_empty_stroke_is_rejected() {
    let mut fx = Fixture::new(5, 5);
    let blank = Array2::<u8>::zeros((3, 3));
    assert_eq!(
        fx.paint(&blank, 0, 0, CAR, None),
        Err(AnnotationError::EmptyStroke)
    );
    assert_eq!(
        fx.paint(&square(2), 10, 10, CAR, None),
        Err(AnnotationError::EmptyStroke)
    );
    assert!(fx.record.is_empty());
    assert!(fx.plane.is_blank());
}

#[test]
fn test_unknown_class_is_rejected() {
    let mut fx = Fixture::new(5, 5);
    for class_id in [0, 5, -2] {
        assert_eq!(
            fx.paint(&square(2), 0, 0, class_id, None),
            Err(AnnotationError::ClassOutOfRange { class_id, count: 4 })
        );
    }
    assert!(fx.plane.is_blank());
}

#[test]
fn test_erase_on_blank_plane_is_noop() {
    let mut fx = Fixture::new(5, 5);
    let summary = fx.erase(&square(5), 0, 0);
    assert_eq!(summary, ReconcileSummary::default());
    assert!(fx.record.is_empty());
}

#[test]
fn test_erase_in_one_frame_leaves_other_frames() {
    let mut fx = Fixture::new(6, 6);
    fx.paint(&square(2), 0, 0, CAR, None).unwrap();

    let mut other_plane = LabelPlane::new(6, 6);
    let mask_cells = square(2);
    let mask = StrokeMask::at_origin(mask_cells.view());
    let catalog = fx.catalog.clone();
    paint(
        FrameTarget {
            record: &mut fx.record,
            plane: &mut other_plane,
            frame: 1,
        },
        &catalog,
        &mask,
        CAR,
        None,
    )
    .unwrap();
    // Object id 0 is taken in frame 0, so frame 1 gets a fresh id
    assert_eq!(fx.record.lookup(1, CAR, 1), Some(1));

    fx.erase(&square(2), 0, 0);
    assert_eq!(fx.record.lookup(0, CAR, 0), None);
    assert_eq!(fx.record.lookup(1, CAR, 0), None);
    assert_eq!(fx.record.lookup(1, CAR, 1), Some(0));
    assert_eq!(fx.record.check_indexes(), Ok(()));
}

#[test]
fn test_refused_object_id_writes_nothing() {
    let mut fx = Fixture::new(10, 10);
    fx.paint(&square(4), 0, 0, ROAD, None).unwrap();
    // A stored plane may carry ids the store refuses
    let too_large = crate::constants::MAX_OBJECT_ID + 5;
    fx.plane.set(9, 9, CAR, too_large);
    let plane_before = fx.plane.clone();
    let record_before = fx.record.clone();

    let strip = Array2::from_elem((2, 4), 1);
    let result = fx.paint(&strip, 2, 0, CAR, Some((9, 9)));

    assert_eq!(
        result,
        Err(AnnotationError::ObjectOutOfRange {
            object_id: too_large
        })
    );
    assert_eq!(fx.plane, plane_before);
    assert_eq!(fx.record, record_before);
    assert_eq!(fx.bounding_box(ROAD, 0), Some(PixelRect::new(0, 0, 4, 4)));
}

#[test]
fn test_class_beyond_store_capacity_writes_nothing() {
    let mut fx = Fixture::new(6, 6);
    fx.paint(&square(2), 0, 0, ROAD, None).unwrap();
    fx.record.set_class_capacity(Some(1));
    let plane_before = fx.plane.clone();

    let result = fx.paint(&square(3), 0, 0, CAR, None);

    assert!(matches!(
        result,
        Err(AnnotationError::ClassOutOfRange { class_id: CAR, .. })
    ));
    assert_eq!(fx.plane, plane_before);
    assert_eq!(fx.bounding_box(ROAD, 0), Some(PixelRect::new(0, 0, 2, 2)));
    fx.assert_matches_plane();
}

#[test]
fn test_custom_multi_instance_class() {
    let mut catalog = ClassCatalog::new();
    let person = catalog.add_class(ClassProperty::multi_instance(
        "Person",
        [0, 200, 0],
        [0, 0, 0],
        [255, 255, 255],
    ));
    let mut record = AnnotationRecord::with_class_capacity(catalog.len());
    let mut plane = LabelPlane::new(4, 4);
    let cells = square(1);
    let mask = StrokeMask::at_origin(cells.view());
    let outcome = paint(
        FrameTarget {
            record: &mut record,
            plane: &mut plane,
            frame: 0,
        },
        &catalog,
        &mask,
        person,
        None,
    )
    .unwrap();
    assert_eq!(outcome.object_id, 0);
    assert_eq!(record.lookup(0, person, 0), Some(outcome.record_id));
}

/// Small deterministic xorshift generator.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

#[test]
fn test_random_strokes_keep_record_consistent() {
    let mut fx = Fixture::new(24, 18);
    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);

    for step in 0..300 {
        let rows = 1 + rng.below(6) as usize;
        let cols = 1 + rng.below(6) as usize;
        let mut cells = Array2::<u8>::zeros((rows, cols));
        for cell in cells.iter_mut() {
            *cell = u8::from(rng.below(4) != 0);
        }
        let x = rng.below(28) as isize - 3;
        let y = rng.below(22) as isize - 3;

        if rng.below(3) == 0 {
            fx.erase(&cells, x, y);
        } else {
            let class_id = 1 + rng.below(4) as ClassId;
            let start = (x.max(0) as usize, y.max(0) as usize);
            match fx.paint(&cells, x, y, class_id, Some(start)) {
                Ok(_) | Err(AnnotationError::EmptyStroke) => {}
                Err(e) => panic!("step {}: unexpected error {}", step, e),
            }
        }
        fx.assert_matches_plane();
    }
}

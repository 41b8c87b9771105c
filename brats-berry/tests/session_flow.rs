//! 从上传到切片渲染与比较报告的完整流程.

use brats_berry::prelude::*;
use brats_berry::render::is_placeholder;
use ndarray::Array3;
use std::num::NonZeroUsize;

const SHAPE: Idx3d = (8, 9, 10);

/// 用阈值代替真实模型: 按强度分段给出三种标签.
struct Banded;

impl Segmenter for Banded {
    fn segment(&self, source: &Volume) -> Result<Segmentation> {
        let label = source.data().mapv(|v| match v {
            v if v > 0.9 => BRATS_ENHANCING,
            v if v > 0.7 => BRATS_EDEMA,
            v if v > 0.5 => BRATS_NECROTIC,
            _ => BRATS_BACKGROUND,
        });
        Ok(Segmentation {
            intensity: source.clone(),
            label: LabelVolume::new(label),
        })
    }
}

fn scan() -> Array3<f32> {
    let (a, b, c) = SHAPE;
    Array3::from_shape_fn(SHAPE, |(i, j, k)| {
        (i * b * c + j * c + k) as f32 / (a * b * c) as f32
    })
}

fn init_logger() {
    // 多个测试都会调用, 重复初始化的错误直接忽略.
    let _ = simple_logger::init_with_level(log::Level::Debug);
}

fn uploaded_session(root: &std::path::Path) -> SessionDir {
    let s = SessionDir::create_in(root).unwrap();
    let tmp = root.join("upload.nii.gz");
    nifti::writer::WriterOptions::new(&tmp)
        .write_nifti(&scan())
        .unwrap();
    s.write_upload("upload.nii.gz", &std::fs::read(&tmp).unwrap())
        .unwrap();
    s
}

#[test]
fn test_upload_diagnose_and_browse() {
    init_logger();
    let root = tempfile::tempdir().unwrap();
    let s = uploaded_session(root.path());
    let cache = VolumeCache::new(CacheConfig::default());

    // 推理前: 类型化接口报告未就绪, UI 接口返回占位图.
    let err = cache.try_get_slice(&s, SliceAxis::Axial, 0).unwrap_err();
    assert!(err.is_not_ready());
    assert!(is_placeholder(&cache.get_slice(Some(&s), SliceAxis::Axial, 0)));
    assert!(!cache.contains(s.id()));

    let d = diagnose(&s, Banded).unwrap();
    assert_eq!(d.shape, SHAPE);
    assert!(d.comparison.is_none());
    assert!(d.stats.total() > 0.0);

    for axis in SliceAxis::ALL {
        let len = [SHAPE.0, SHAPE.1, SHAPE.2][axis.index()];
        let first = cache.get_slice(Some(&s), axis, 0);
        assert!(!is_placeholder(&first));
        // 同一会话的重复请求结果一致.
        assert_eq!(first, cache.get_slice(Some(&s), axis, 0));
        assert!(cache.try_get_slice(&s, axis, len - 1).is_ok());
        assert!(matches!(
            cache.try_get_slice(&s, axis, len),
            Err(Error::SliceOutOfRange { .. })
        ));
    }
    assert_eq!(cache.len(), 1);

    // 轴向切片: 形状 (axis0, axis1) 旋转后宽为 axis0, 高为 axis1.
    let axial = cache.get_slice(Some(&s), SliceAxis::Axial, 3);
    assert_eq!(axial.dimensions(), (SHAPE.0 as u32, SHAPE.1 as u32));
}

#[test]
fn test_ground_truth_comparison() {
    init_logger();
    let root = tempfile::tempdir().unwrap();
    let s = uploaded_session(root.path());

    let truth = Banded.segment(&Volume::new(scan())).unwrap().label;
    let tmp = root.path().join("truth.nii.gz");
    truth.save_nifti(&tmp, None).unwrap();
    s.write_ground_truth("truth.nii.gz", &std::fs::read(&tmp).unwrap())
        .unwrap();

    let d = diagnose(&s, Banded).unwrap();
    let report = d.comparison.unwrap().unwrap();
    assert_eq!(report.mean_dice(), 1.0);
    for m in report.regions() {
        assert_eq!(m.grade(), DiceGrade::Good);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
    }

    // 导出的预测标签可以重新读回, 且与真值一致.
    let exported = LabelVolume::open_nifti(s.prediction_path()).unwrap();
    assert_eq!(compare(&exported, &truth).unwrap().mean_dice(), 1.0);
}

#[test]
fn test_cache_survives_many_sessions() {
    init_logger();
    let root = tempfile::tempdir().unwrap();
    let cache = VolumeCache::new(CacheConfig::with_capacity(NonZeroUsize::new(2).unwrap()));

    let sessions: Vec<_> = (0..3)
        .map(|_| {
            let s = SessionDir::create_in(root.path()).unwrap();
            let (scan, label) = (Volume::new(scan()), LabelVolume::new(Array3::zeros(SHAPE)));
            s.persist_inference(&scan, &label).unwrap();
            s
        })
        .collect();

    for s in sessions.iter() {
        assert!(cache.try_get_slice(s, SliceAxis::Coronal, 4).is_ok());
    }
    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(sessions[0].id()));
    // 被淘汰的会话可重新加载.
    assert!(cache.try_get_slice(&sessions[0], SliceAxis::Coronal, 4).is_ok());
    assert!(cache.contains(sessions[0].id()));
}

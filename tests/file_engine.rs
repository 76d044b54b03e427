use anyhow::Result;
use facematch::config::Config;
use facematch::{build_engine, EnrollError, FileEngine, GalleryStore, MatchDecision};
use facematch_engine::{DetectionError, SampleFault, ValidationError};

/// Detector report for one face whose embedding has cosine `score` with
/// the report produced by `report(1.0)`.
fn report(score: f32) -> Vec<u8> {
    let other = (1.0 - score * score).max(0.0).sqrt();
    format!(r#"{{"faces": [{{"score": 0.95, "embedding": [{score}, {other}, 0.0]}}]}}"#).into_bytes()
}

struct TempEngine {
    engine: FileEngine,
    cfg: Config,
}

impl TempEngine {
    fn new() -> Result<Self> {
        let cfg = Config {
            store_prefix: std::env::temp_dir().join(format!("facematch-it-{}", uuid::Uuid::new_v4())),
            ..Config::default()
        };
        Ok(Self {
            engine: build_engine(&cfg)?,
            cfg,
        })
    }
}

impl Drop for TempEngine {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.cfg.store_prefix).ok();
    }
}

#[test]
fn test_enroll_then_recognize() -> Result<()> {
    env_logger::try_init().ok();
    let t = TempEngine::new()?;
    let gallery = t.engine.gallery();
    gallery.register("alice")?;
    gallery.register("bob")?;

    t.engine.enroll("alice", &[report(1.0), report(0.98), report(0.97)])?;
    t.engine.enroll("bob", &[report(0.2), report(0.1), report(0.3)])?;
    assert!(t.engine.is_enrolled("alice")?);

    let decision = t.engine.recognize(&report(0.99))?;
    assert_eq!(decision.person_id(), Some("alice"));

    // A fresh engine over the same directory sees the same gallery.
    let reopened = build_engine(&t.cfg)?;
    assert_eq!(reopened.recognize(&report(0.99))?, decision);
    Ok(())
}

#[test]
fn test_failed_enrollment_writes_nothing() -> Result<()> {
    env_logger::try_init().ok();
    let t = TempEngine::new()?;
    t.engine.gallery().register("carol")?;

    let two_faces = br#"{"faces": [
        {"score": 0.9, "embedding": [1.0, 0.0, 0.0]},
        {"score": 0.9, "embedding": [0.0, 1.0, 0.0]}
    ]}"#
    .to_vec();
    let err = t
        .engine
        .enroll("carol", &[report(1.0), two_faces, report(0.9)])
        .unwrap_err();
    assert_eq!(
        err,
        EnrollError::Validation(ValidationError::InvalidSample {
            index: 1,
            reason: SampleFault::Detection(DetectionError::MultipleFaces { count: 2 }),
        })
    );
    assert_eq!(t.engine.gallery().get("carol")?, None);
    assert!(t.engine.gallery().get_all_enrolled()?.is_empty());
    Ok(())
}

#[test]
fn test_unregistered_person() -> Result<()> {
    env_logger::try_init().ok();
    let t = TempEngine::new()?;
    let err = t
        .engine
        .enroll("nobody", &[report(1.0), report(1.0), report(1.0)])
        .unwrap_err();
    assert_eq!(err, EnrollError::NotFound("nobody".into()));
    Ok(())
}

#[test]
fn test_low_quality_probe_rejected() -> Result<()> {
    env_logger::try_init().ok();
    let t = TempEngine::new()?;
    let blurry = br#"{"faces": [{"score": 0.3, "embedding": [1.0, 0.0, 0.0]}]}"#;
    assert_eq!(
        t.engine.recognize(blurry)?,
        MatchDecision::Rejected {
            reason: SampleFault::Detection(DetectionError::LowQuality { score: 0.3 })
        }
    );
    Ok(())
}

#[test]
fn test_decision_json() -> Result<()> {
    let decision = MatchDecision::Matched {
        person_id: "alice".into(),
        confidence: 0.5,
        gap: 0.25,
    };
    let value = serde_json::to_value(&decision)?;
    assert_eq!(
        value,
        serde_json::json!({"decision": "matched", "person_id": "alice", "confidence": 0.5, "gap": 0.25})
    );
    let rejected = serde_json::to_value(MatchDecision::Rejected {
        reason: SampleFault::Detection(DetectionError::NoFace),
    })?;
    assert_eq!(
        rejected,
        serde_json::json!({"decision": "rejected", "reason": {"detection": "no_face"}})
    );
    Ok(())
}

// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Coordinates the other layers to run one training job from
// raw data to saved artifact. No ML math and no printing here —
// this layer only directs the workflow.

// The training workflow
pub mod train_use_case;

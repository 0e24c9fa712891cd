pub mod stage2_partition;
pub mod stage3_aggregate;
pub mod stage4_rank;
pub mod stage5_report;

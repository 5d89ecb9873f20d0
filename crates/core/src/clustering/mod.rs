pub mod cluster_store;
pub mod observation;
pub mod person_cluster;
pub mod result_ranker;

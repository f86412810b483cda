pub mod anomaly_queries;

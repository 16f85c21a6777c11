//! Neo4j client for the durable operations store
//!
//! System of record for the append-only map version log, status requests,
//! maintenance cycles, notifications, and users. Timestamps are stored as
//! RFC 3339 strings (always UTC), so string ordering matches time ordering.

use super::models::{UserNode, UserRole};
use crate::cycle::models::Cycle;
use crate::map::models::{TaskType, Tracker};
use crate::notify::types::{Notification, NotificationKind};
use crate::tenant::OrgRef;
use crate::workflow::models::{RequestStatus, TrackerStatusRequest};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use neo4rs::{query, Graph};
use std::sync::Arc;
use uuid::Uuid;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the schema with constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            // One row per (tenant, version) — the append-only log's key and
            // the backstop against concurrent version collisions
            "CREATE CONSTRAINT map_version_key IF NOT EXISTS FOR (m:PlantMapVersion) REQUIRE m.key IS UNIQUE",
            "CREATE CONSTRAINT status_request_id IF NOT EXISTS FOR (r:StatusRequest) REQUIRE r.id IS UNIQUE",
            "CREATE CONSTRAINT cycle_id IF NOT EXISTS FOR (c:MaintenanceCycle) REQUIRE c.id IS UNIQUE",
            // One cycle per (tenant, task type, number) — makes lazy
            // creation and reset safe under concurrency
            "CREATE CONSTRAINT cycle_sequence_key IF NOT EXISTS FOR (c:MaintenanceCycle) REQUIRE c.sequence_key IS UNIQUE",
            // One notification per (kind, request, recipient)
            "CREATE CONSTRAINT notification_key IF NOT EXISTS FOR (n:Notification) REQUIRE n.dedup_key IS UNIQUE",
            "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX map_version_org IF NOT EXISTS FOR (m:PlantMapVersion) ON (m.org_id)",
            "CREATE INDEX status_request_org IF NOT EXISTS FOR (r:StatusRequest) ON (r.org_id)",
            "CREATE INDEX status_request_status IF NOT EXISTS FOR (r:StatusRequest) ON (r.status)",
            "CREATE INDEX status_request_dedup IF NOT EXISTS FOR (r:StatusRequest) ON (r.dedup_key)",
            "CREATE INDEX cycle_org IF NOT EXISTS FOR (c:MaintenanceCycle) ON (c.org_id)",
            "CREATE INDEX cycle_task_type IF NOT EXISTS FOR (c:MaintenanceCycle) ON (c.task_type)",
            "CREATE INDEX notification_org IF NOT EXISTS FOR (n:Notification) ON (n.org_id)",
            "CREATE INDEX notification_recipient IF NOT EXISTS FOR (n:Notification) ON (n.recipient_id)",
            "CREATE INDEX notification_request IF NOT EXISTS FOR (n:Notification) ON (n.request_id)",
            "CREATE INDEX user_org IF NOT EXISTS FOR (u:User) ON (u.org_id)",
            "CREATE INDEX user_role IF NOT EXISTS FOR (u:User) ON (u.role)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Connectivity probe
    pub async fn health_check(&self) -> Result<bool> {
        match self.graph.execute(query("RETURN 1 AS ok")).await {
            Ok(mut result) => Ok(result.next().await?.is_some()),
            Err(_) => Ok(false),
        }
    }

    // ========================================================================
    // Map version log
    // ========================================================================

    /// Append one map version row. The unique `key` constraint rejects a
    /// concurrent writer that lost the version race.
    pub async fn append_map_version(
        &self,
        org: &OrgRef,
        trackers: &[Tracker],
        version: i64,
    ) -> Result<()> {
        let payload =
            serde_json::to_string(trackers).context("Failed to serialize tracker list")?;

        let q = query(
            r#"
            CREATE (m:PlantMapVersion {
                key: $key,
                org_id: $org_id,
                org_slug: $org_slug,
                version: $version,
                trackers: $trackers,
                updated_at: $updated_at
            })
            "#,
        )
        .param("key", format!("{}:{}", org.id, version))
        .param("org_id", org.id.to_string())
        .param("org_slug", org.slug.clone())
        .param("version", version)
        .param("trackers", payload)
        .param("updated_at", Utc::now().to_rfc3339());

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to append map version {} for {}", version, org.slug))?;
        Ok(())
    }

    /// Latest map row for a tenant
    pub async fn latest_map_version(&self, org_id: Uuid) -> Result<Option<(Vec<Tracker>, i64)>> {
        let q = query(
            r#"
            MATCH (m:PlantMapVersion {org_id: $org_id})
            RETURN m
            ORDER BY m.version DESC
            LIMIT 1
            "#,
        )
        .param("org_id", org_id.to_string());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("m")?;
            let version: i64 = node.get("version")?;
            let trackers: Vec<Tracker> = serde_json::from_str(&node.get::<String>("trackers")?)
                .context("Corrupt tracker payload in map version row")?;
            Ok(Some((trackers, version)))
        } else {
            Ok(None)
        }
    }

    /// Every tenant with at least one map version row
    pub async fn list_map_tenants(&self) -> Result<Vec<OrgRef>> {
        let q = query(
            r#"
            MATCH (m:PlantMapVersion)
            RETURN DISTINCT m.org_id AS org_id, m.org_slug AS org_slug
            "#,
        );

        let mut result = self.graph.execute(q).await?;
        let mut tenants = Vec::new();
        while let Some(row) = result.next().await? {
            tenants.push(OrgRef {
                id: row.get::<String>("org_id")?.parse()?,
                slug: row.get("org_slug")?,
            });
        }
        Ok(tenants)
    }

    // ========================================================================
    // Status requests
    // ========================================================================

    /// Persist a new pending request
    pub async fn create_status_request(
        &self,
        org_id: Uuid,
        request: &TrackerStatusRequest,
    ) -> Result<()> {
        let q = query(
            r#"
            CREATE (r:StatusRequest {
                id: $id,
                org_id: $org_id,
                requester_id: $requester_id,
                tracker_ids: $tracker_ids,
                task_type: $task_type,
                status_type: $status_type,
                message: $message,
                status: $status,
                rejection_reason: '',
                reviewer_id: '',
                reviewed_at: '',
                dedup_key: $dedup_key,
                created_at: $created_at
            })
            "#,
        )
        .param("id", request.id.to_string())
        .param("org_id", org_id.to_string())
        .param("requester_id", request.requester.to_string())
        .param("tracker_ids", request.tracker_ids.clone())
        .param("task_type", request.task_type.as_str())
        .param("status_type", request.status_type.as_str())
        .param("message", request.message.clone().unwrap_or_default())
        .param("status", request.status.as_str())
        .param("dedup_key", request.dedup_key())
        .param("created_at", request.created_at.to_rfc3339());

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to create status request {}", request.id))?;
        Ok(())
    }

    /// Get a request by id
    pub async fn get_status_request(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TrackerStatusRequest>> {
        let q = query(
            r#"
            MATCH (r:StatusRequest {id: $id, org_id: $org_id})
            RETURN r
            "#,
        )
        .param("id", id.to_string())
        .param("org_id", org_id.to_string());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("r")?;
            Ok(Some(self.node_to_request(&node)?))
        } else {
            Ok(None)
        }
    }

    /// List requests, newest first, optionally filtered by status
    pub async fn list_status_requests(
        &self,
        org_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<TrackerStatusRequest>> {
        let cypher = match status {
            Some(_) => {
                r#"
                MATCH (r:StatusRequest {org_id: $org_id, status: $status})
                RETURN r
                ORDER BY r.created_at DESC
                "#
            }
            None => {
                r#"
                MATCH (r:StatusRequest {org_id: $org_id})
                RETURN r
                ORDER BY r.created_at DESC
                "#
            }
        };

        let mut q = query(cypher).param("org_id", org_id.to_string());
        if let Some(status) = status {
            q = q.param("status", status.as_str());
        }

        let mut result = self.graph.execute(q).await?;
        let mut requests = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("r")?;
            requests.push(self.node_to_request(&node)?);
        }
        Ok(requests)
    }

    /// Most recent pending request with this dedup key since `since`.
    /// RFC 3339 UTC strings compare in time order.
    pub async fn find_pending_duplicate(
        &self,
        org_id: Uuid,
        dedup_key: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<TrackerStatusRequest>> {
        let q = query(
            r#"
            MATCH (r:StatusRequest {org_id: $org_id, dedup_key: $dedup_key, status: 'pending'})
            WHERE r.created_at >= $since
            RETURN r
            ORDER BY r.created_at DESC
            LIMIT 1
            "#,
        )
        .param("org_id", org_id.to_string())
        .param("dedup_key", dedup_key)
        .param("since", since.to_rfc3339());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("r")?;
            Ok(Some(self.node_to_request(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Record the terminal decision on a request
    pub async fn record_decision(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: RequestStatus,
        reviewer: Uuid,
        reviewed_at: DateTime<Utc>,
        rejection_reason: Option<&str>,
    ) -> Result<()> {
        let q = query(
            r#"
            MATCH (r:StatusRequest {id: $id, org_id: $org_id})
            SET r.status = $status,
                r.reviewer_id = $reviewer_id,
                r.reviewed_at = $reviewed_at,
                r.rejection_reason = $rejection_reason
            RETURN r.id AS id
            "#,
        )
        .param("id", id.to_string())
        .param("org_id", org_id.to_string())
        .param("status", status.as_str())
        .param("reviewer_id", reviewer.to_string())
        .param("reviewed_at", reviewed_at.to_rfc3339())
        .param("rejection_reason", rejection_reason.unwrap_or_default());

        let mut result = self.graph.execute(q).await?;
        if result.next().await?.is_none() {
            return Err(anyhow!("Status request {} not found", id));
        }
        Ok(())
    }

    fn node_to_request(&self, node: &neo4rs::Node) -> Result<TrackerStatusRequest> {
        let empty_is_none = |s: String| if s.is_empty() { None } else { Some(s) };

        Ok(TrackerStatusRequest {
            id: node.get::<String>("id")?.parse()?,
            requester: node.get::<String>("requester_id")?.parse()?,
            tracker_ids: node.get::<Vec<String>>("tracker_ids").unwrap_or_default(),
            task_type: node
                .get::<String>("task_type")?
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            status_type: node
                .get::<String>("status_type")?
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            message: node.get::<String>("message").ok().and_then(empty_is_none),
            status: match node.get::<String>("status")?.as_str() {
                "pending" => RequestStatus::Pending,
                "approved" => RequestStatus::Approved,
                "rejected" => RequestStatus::Rejected,
                other => return Err(anyhow!("Unknown request status: {other}")),
            },
            reviewer: node
                .get::<String>("reviewer_id")
                .ok()
                .and_then(|s| s.parse().ok()),
            reviewed_at: node
                .get::<String>("reviewed_at")
                .ok()
                .and_then(|s| s.parse().ok()),
            rejection_reason: node
                .get::<String>("rejection_reason")
                .ok()
                .and_then(empty_is_none),
            created_at: node
                .get::<String>("created_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    // ========================================================================
    // Maintenance cycles
    // ========================================================================

    /// Persist a new cycle row
    pub async fn create_cycle(&self, org_id: Uuid, cycle: &Cycle) -> Result<()> {
        let q = query(
            r#"
            CREATE (c:MaintenanceCycle {
                id: $id,
                sequence_key: $sequence_key,
                org_id: $org_id,
                task_type: $task_type,
                cycle_number: $cycle_number,
                started_at: $started_at,
                completed_at: $completed_at,
                reset_by: $reset_by,
                reset_at: $reset_at,
                year: $year,
                month: $month
            })
            "#,
        )
        .param("id", cycle.id.to_string())
        .param(
            "sequence_key",
            format!("{}:{}:{}", org_id, cycle.task_type, cycle.cycle_number),
        )
        .param("org_id", org_id.to_string())
        .param("task_type", cycle.task_type.as_str())
        .param("cycle_number", cycle.cycle_number)
        .param("started_at", cycle.started_at.to_rfc3339())
        .param(
            "completed_at",
            cycle.completed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        )
        .param(
            "reset_by",
            cycle.reset_by.map(|u| u.to_string()).unwrap_or_default(),
        )
        .param(
            "reset_at",
            cycle.reset_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        )
        .param("year", i64::from(cycle.year.unwrap_or(0)))
        .param("month", i64::from(cycle.month.unwrap_or(0)));

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to create cycle {}", cycle.id))?;
        Ok(())
    }

    /// The active (incomplete) cycle for a task type
    pub async fn active_cycle(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<Cycle>> {
        let q = query(
            r#"
            MATCH (c:MaintenanceCycle {org_id: $org_id, task_type: $task_type, completed_at: ''})
            RETURN c
            ORDER BY c.cycle_number DESC
            LIMIT 1
            "#,
        )
        .param("org_id", org_id.to_string())
        .param("task_type", task_type.as_str());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("c")?;
            Ok(Some(self.node_to_cycle(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Highest cycle number ever issued for a task type
    pub async fn latest_cycle_number(
        &self,
        org_id: Uuid,
        task_type: TaskType,
    ) -> Result<Option<i64>> {
        let q = query(
            r#"
            MATCH (c:MaintenanceCycle {org_id: $org_id, task_type: $task_type})
            RETURN max(c.cycle_number) AS max_number
            "#,
        )
        .param("org_id", org_id.to_string())
        .param("task_type", task_type.as_str());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            Ok(row.get::<i64>("max_number").ok())
        } else {
            Ok(None)
        }
    }

    /// Most recent cycle (active or completed)
    pub async fn latest_cycle(&self, org_id: Uuid, task_type: TaskType) -> Result<Option<Cycle>> {
        let q = query(
            r#"
            MATCH (c:MaintenanceCycle {org_id: $org_id, task_type: $task_type})
            RETURN c
            ORDER BY c.cycle_number DESC
            LIMIT 1
            "#,
        )
        .param("org_id", org_id.to_string())
        .param("task_type", task_type.as_str());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("c")?;
            Ok(Some(self.node_to_cycle(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Complete a cycle, denormalizing year/month from the completion time.
    /// Completing an already-completed cycle is a no-op.
    pub async fn complete_cycle(
        &self,
        org_id: Uuid,
        cycle_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        use chrono::Datelike;

        let q = query(
            r#"
            MATCH (c:MaintenanceCycle {id: $id, org_id: $org_id})
            WHERE c.completed_at = ''
            SET c.completed_at = $completed_at,
                c.year = $year,
                c.month = $month
            "#,
        )
        .param("id", cycle_id.to_string())
        .param("org_id", org_id.to_string())
        .param("completed_at", completed_at.to_rfc3339())
        .param("year", i64::from(completed_at.year()))
        .param("month", i64::from(completed_at.month()));

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to complete cycle {}", cycle_id))?;
        Ok(())
    }

    /// Cycles for a task type, optionally filtered by denormalized year/month
    pub async fn list_cycles(
        &self,
        org_id: Uuid,
        task_type: TaskType,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<Cycle>> {
        let mut conditions = Vec::new();
        if year.is_some() {
            conditions.push("c.year = $year");
        }
        if month.is_some() {
            conditions.push("c.month = $month");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let cypher = format!(
            r#"
            MATCH (c:MaintenanceCycle {{org_id: $org_id, task_type: $task_type}})
            {}
            RETURN c
            ORDER BY c.cycle_number
            "#,
            where_clause
        );

        let mut q = query(&cypher)
            .param("org_id", org_id.to_string())
            .param("task_type", task_type.as_str());
        if let Some(year) = year {
            q = q.param("year", i64::from(year));
        }
        if let Some(month) = month {
            q = q.param("month", i64::from(month));
        }

        let mut result = self.graph.execute(q).await?;
        let mut cycles = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("c")?;
            cycles.push(self.node_to_cycle(&node)?);
        }
        Ok(cycles)
    }

    fn node_to_cycle(&self, node: &neo4rs::Node) -> Result<Cycle> {
        let completed_at: Option<DateTime<Utc>> = node
            .get::<String>("completed_at")
            .ok()
            .and_then(|s| s.parse().ok());

        Ok(Cycle {
            id: node.get::<String>("id")?.parse()?,
            task_type: node
                .get::<String>("task_type")?
                .parse()
                .map_err(|e: String| anyhow!(e))?,
            cycle_number: node.get("cycle_number")?,
            started_at: node
                .get::<String>("started_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
            completed_at,
            reset_by: node
                .get::<String>("reset_by")
                .ok()
                .and_then(|s| s.parse().ok()),
            reset_at: node
                .get::<String>("reset_at")
                .ok()
                .and_then(|s| s.parse().ok()),
            year: match node.get::<i64>("year").unwrap_or(0) {
                0 => None,
                y => Some(y as i32),
            },
            month: match node.get::<i64>("month").unwrap_or(0) {
                0 => None,
                m => Some(m as u32),
            },
        })
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Persist a notification unless the (kind, request, recipient) key
    /// already exists. The MERGE is atomic; `created` tells the caller
    /// whether this attempt won.
    pub async fn create_notification(
        &self,
        org_id: Uuid,
        notification: &Notification,
    ) -> Result<bool> {
        let q = query(
            r#"
            MERGE (n:Notification {dedup_key: $dedup_key})
            ON CREATE SET
                n.id = $id,
                n.org_id = $org_id,
                n.recipient_id = $recipient_id,
                n.kind = $kind,
                n.title = $title,
                n.message = $message,
                n.request_id = $request_id,
                n.acknowledged = false,
                n.created_at = $created_at
            RETURN n.id = $id AS created
            "#,
        )
        .param("dedup_key", notification.dedup_key())
        .param("id", notification.id.to_string())
        .param("org_id", org_id.to_string())
        .param("recipient_id", notification.recipient.to_string())
        .param("kind", notification.kind.as_str())
        .param("title", notification.title.clone())
        .param("message", notification.message.clone())
        .param("request_id", notification.request_id.to_string())
        .param("created_at", notification.created_at.to_rfc3339());

        let mut result = self.graph.execute(q).await?;
        match result.next().await? {
            Some(row) => Ok(row.get::<bool>("created").unwrap_or(false)),
            None => Ok(false),
        }
    }

    /// Acknowledge the admin submission notifications for a request
    pub async fn acknowledge_request_notifications(
        &self,
        org_id: Uuid,
        request_id: Uuid,
    ) -> Result<u64> {
        let q = query(
            r#"
            MATCH (n:Notification {org_id: $org_id, request_id: $request_id, kind: $kind})
            WHERE n.acknowledged = false
            SET n.acknowledged = true
            RETURN count(n) AS updated
            "#,
        )
        .param("org_id", org_id.to_string())
        .param("request_id", request_id.to_string())
        .param("kind", NotificationKind::StatusRequestSubmitted.as_str());

        let mut result = self.graph.execute(q).await?;
        match result.next().await? {
            Some(row) => Ok(row.get::<i64>("updated").unwrap_or(0).max(0) as u64),
            None => Ok(0),
        }
    }

    /// Notifications for one recipient, newest first
    pub async fn list_notifications(
        &self,
        org_id: Uuid,
        recipient: Uuid,
    ) -> Result<Vec<Notification>> {
        let q = query(
            r#"
            MATCH (n:Notification {org_id: $org_id, recipient_id: $recipient_id})
            RETURN n
            ORDER BY n.created_at DESC
            "#,
        )
        .param("org_id", org_id.to_string())
        .param("recipient_id", recipient.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut notifications = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("n")?;
            notifications.push(self.node_to_notification(&node)?);
        }
        Ok(notifications)
    }

    fn node_to_notification(&self, node: &neo4rs::Node) -> Result<Notification> {
        Ok(Notification {
            id: node.get::<String>("id")?.parse()?,
            recipient: node.get::<String>("recipient_id")?.parse()?,
            kind: match node.get::<String>("kind")?.as_str() {
                "status_request_submitted" => NotificationKind::StatusRequestSubmitted,
                "status_request_decided" => NotificationKind::StatusRequestDecided,
                other => return Err(anyhow!("Unknown notification kind: {other}")),
            },
            title: node.get("title")?,
            message: node.get("message")?,
            request_id: node.get::<String>("request_id")?.parse()?,
            acknowledged: node.get("acknowledged").unwrap_or(false),
            created_at: node
                .get::<String>("created_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Create a user
    pub async fn create_user(&self, user: &UserNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (u:User {
                id: $id,
                org_id: $org_id,
                email: $email,
                name: $name,
                role: $role,
                created_at: $created_at
            })
            "#,
        )
        .param("id", user.id.to_string())
        .param("org_id", user.org_id.to_string())
        .param("email", user.email.clone())
        .param("name", user.name.clone())
        .param("role", user.role.as_str())
        .param("created_at", user.created_at.to_rfc3339());

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to create user {}", user.id))?;
        Ok(())
    }

    /// Ids of every administrator in an organization
    pub async fn list_administrators(&self, org_id: Uuid) -> Result<Vec<Uuid>> {
        let q = query(
            r#"
            MATCH (u:User {org_id: $org_id, role: $role})
            RETURN u.id AS id
            "#,
        )
        .param("org_id", org_id.to_string())
        .param("role", UserRole::Admin.as_str());

        let mut result = self.graph.execute(q).await?;
        let mut ids = Vec::new();
        while let Some(row) = result.next().await? {
            ids.push(row.get::<String>("id")?.parse()?);
        }
        Ok(ids)
    }
}
